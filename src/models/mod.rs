mod expense;
mod fee;
mod ledger;
mod student;
mod teacher;

pub use expense::{Expense, ExpenseCategory, ExpenseInput};
pub use fee::{ChargeKind, FeeCharges, FeeGeneration, FeeSubmission, StudentFee, StudentInfo};
pub use ledger::LedgerEntry;
pub use student::{Student, StudentInput};
pub use teacher::{GenerateTeacherPay, Teacher, TeacherInput, TeacherPayment, TeacherPaymentInput};

use std::fmt;
use std::hash::Hash;

/// A backend row with a stable identifier.
pub trait Record {
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;

    /// Short label used in diagnostics, e.g. "expense #12".
    fn describe(&self) -> String;
}

fn default_true() -> bool {
    true
}

/// `Some("")` and `None` both mean "no document".
fn has_file(reference: &Option<String>) -> bool {
    reference.as_deref().is_some_and(|s| !s.trim().is_empty())
}
