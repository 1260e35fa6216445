use super::{month_matches, Criteria, Exact, TriState};
use crate::dates::YearMonth;
use crate::diagnostics::Diagnostics;
use crate::models::TeacherPayment;
use crate::money::Money;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentCriteria {
    pub teacher: Exact<i64>,
    pub month: Option<YearMonth>,
    pub paid: TriState,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentSummary {
    pub count: usize,
    pub total: Money,
    pub paid: Money,
    pub pending: Money,
}

impl Criteria<TeacherPayment> for PaymentCriteria {
    type Summary = PaymentSummary;

    fn matches(&self, payment: &TeacherPayment, diagnostics: &mut Diagnostics) -> bool {
        self.teacher.matches(&payment.teacher)
            && self.paid.matches(payment.paid)
            && month_matches(self.month, payment, &payment.month, diagnostics)
    }

    fn is_empty(&self) -> bool {
        !(self.teacher.is_active() || self.month.is_some() || self.paid.is_active())
    }

    fn summarize(rows: &[&TeacherPayment]) -> PaymentSummary {
        let total: Money = rows.iter().map(|p| p.pay).sum();
        let paid: Money = rows.iter().filter(|p| p.paid).map(|p| p.pay).sum();
        PaymentSummary {
            count: rows.len(),
            total,
            paid,
            pending: total - paid,
        }
    }
}
