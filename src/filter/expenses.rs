use super::{date_in_range, Criteria, DateRange, Exact, NumRange, TextFilter};
use crate::diagnostics::Diagnostics;
use crate::models::{Expense, ExpenseCategory};
use crate::money::Money;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseCriteria {
    pub date: DateRange,
    pub category: Exact<ExpenseCategory>,
    pub amount: NumRange,
    pub description: TextFilter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: Money,
}

impl Criteria<Expense> for ExpenseCriteria {
    type Summary = ExpenseSummary;

    fn matches(&self, expense: &Expense, diagnostics: &mut Diagnostics) -> bool {
        date_in_range(&self.date, expense, "date", &expense.date, diagnostics)
            && self.category.matches(&expense.category)
            && self.amount.contains(expense.amount)
            && self
                .description
                .matches(expense.description.as_deref().unwrap_or_default())
    }

    fn is_empty(&self) -> bool {
        !(self.date.is_active()
            || self.category.is_active()
            || self.amount.is_active()
            || self.description.is_active())
    }

    fn summarize(rows: &[&Expense]) -> ExpenseSummary {
        ExpenseSummary {
            count: rows.len(),
            total: rows.iter().map(|e| e.amount).sum(),
        }
    }
}
