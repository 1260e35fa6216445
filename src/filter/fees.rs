use super::{month_matches, Criteria, TextFilter, TriState};
use crate::dates::YearMonth;
use crate::diagnostics::Diagnostics;
use crate::models::StudentFee;
use crate::money::Money;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeCriteria {
    pub paid: TriState,
    pub month: Option<YearMonth>,
    /// Matches student name, roll number or grade.
    pub search: TextFilter,
}

/// Totals over visible fee rows. `paid` sums the full bill of paid rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSummary {
    pub count: usize,
    pub total: Money,
    pub paid: Money,
    pub pending: Money,
}

impl Criteria<StudentFee> for FeeCriteria {
    type Summary = FeeSummary;

    fn matches(&self, fee: &StudentFee, diagnostics: &mut Diagnostics) -> bool {
        let info = &fee.student_info;
        self.paid.matches(fee.paid)
            && month_matches(self.month, fee, &fee.month, diagnostics)
            && self.search.matches_any([
                info.name.as_str(),
                info.roll_no.to_string().as_str(),
                info.grade.to_string().as_str(),
            ])
    }

    fn is_empty(&self) -> bool {
        !(self.paid.is_active() || self.month.is_some() || self.search.is_active())
    }

    fn summarize(rows: &[&StudentFee]) -> FeeSummary {
        let total: Money = rows.iter().map(|f| f.total_fee).sum();
        let paid: Money = rows.iter().filter(|f| f.paid).map(|f| f.total_fee).sum();
        FeeSummary {
            count: rows.len(),
            total,
            paid,
            pending: total - paid,
        }
    }
}
