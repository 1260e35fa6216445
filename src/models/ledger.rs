use serde::{Deserialize, Serialize};

use super::Record;
use crate::money::Money;

/// Monthly aggregate maintained by the backend.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LedgerEntry {
    #[serde(default)]
    pub id: i64,
    pub month: String,
    #[serde(rename = "MonthlyStudentFees", default)]
    pub student_fees: Money,
    #[serde(rename = "MonthlyTeacherPays", default)]
    pub teacher_pays: Money,
    #[serde(rename = "MonthlyExpenses", default)]
    pub expenses: Money,
    #[serde(rename = "MonthlyProfit", default)]
    pub profit: Money,
}

impl Record for LedgerEntry {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn describe(&self) -> String {
        format!("ledger {}", self.month)
    }
}
