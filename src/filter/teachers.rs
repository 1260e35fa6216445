use super::{Criteria, Exact, NumRange, TextFilter, TriState};
use crate::diagnostics::Diagnostics;
use crate::models::Teacher;
use crate::money::Money;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherCriteria {
    pub name: TextFilter,
    pub qualification: Exact<String>,
    pub enrolled: TriState,
    pub pay: NumRange,
    pub has_document: TriState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeacherSummary {
    pub count: usize,
    pub enrolled: usize,
    pub payroll: Money,
}

impl Criteria<Teacher> for TeacherCriteria {
    type Summary = TeacherSummary;

    fn matches(&self, t: &Teacher, _: &mut Diagnostics) -> bool {
        self.name.matches(&t.name)
            && self.qualification.matches_text(&t.qualification)
            && self.enrolled.matches(t.enrolled)
            && self.pay.contains(t.pay)
            && self.has_document.matches(t.has_document())
    }

    fn is_empty(&self) -> bool {
        !(self.name.is_active()
            || self.qualification.is_active()
            || self.enrolled.is_active()
            || self.pay.is_active()
            || self.has_document.is_active())
    }

    fn summarize(rows: &[&Teacher]) -> TeacherSummary {
        TeacherSummary {
            count: rows.len(),
            enrolled: rows.iter().filter(|t| t.enrolled).count(),
            payroll: rows.iter().map(|t| t.pay).sum(),
        }
    }
}
