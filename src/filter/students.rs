use super::{Criteria, Exact, NumRange, TextFilter, TriState};
use crate::diagnostics::Diagnostics;
use crate::models::Student;
use crate::money::Money;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentCriteria {
    pub name: TextFilter,
    pub father_name: TextFilter,
    pub grade: Exact<i32>,
    pub contact: TextFilter,
    pub enrolled: TriState,
    pub has_document: TriState,
    pub tuition: NumRange,
    pub security: NumRange,
    pub admission: NumRange,
    pub pending: NumRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentSummary {
    pub count: usize,
    pub enrolled: usize,
    pub pending: Money,
}

impl Criteria<Student> for StudentCriteria {
    type Summary = StudentSummary;

    fn matches(&self, s: &Student, _: &mut Diagnostics) -> bool {
        self.name.matches(&s.name)
            && self.father_name.matches(&s.father_name)
            && self.grade.matches(&s.grade)
            && self.contact.matches(&s.contact)
            && self.enrolled.matches(s.enrolled)
            && self.has_document.matches(s.has_document())
            && self.tuition.contains(s.tuition_fee)
            && self.security.contains(s.security_fee)
            && self.admission.contains(s.admission_fee)
            && self.pending.contains(s.pending_fee)
    }

    fn is_empty(&self) -> bool {
        !(self.name.is_active()
            || self.father_name.is_active()
            || self.grade.is_active()
            || self.contact.is_active()
            || self.enrolled.is_active()
            || self.has_document.is_active()
            || self.tuition.is_active()
            || self.security.is_active()
            || self.admission.is_active()
            || self.pending.is_active())
    }

    fn summarize(rows: &[&Student]) -> StudentSummary {
        StudentSummary {
            count: rows.len(),
            enrolled: rows.iter().filter(|s| s.enrolled).count(),
            pending: rows.iter().map(|s| s.pending_fee).sum(),
        }
    }
}
