use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Record;
use crate::error::SchoolError;
use crate::money::Money;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    Rent,
    UtilityBills,
    AcademicExpenses,
    #[serde(alias = "ADM_GEN_EXPENSES")]
    AdminGenExpenses,
    Salaries,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Rent,
        ExpenseCategory::UtilityBills,
        ExpenseCategory::AcademicExpenses,
        ExpenseCategory::AdminGenExpenses,
        ExpenseCategory::Salaries,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "RENT",
            ExpenseCategory::UtilityBills => "UTILITY_BILLS",
            ExpenseCategory::AcademicExpenses => "ACADEMIC_EXPENSES",
            ExpenseCategory::AdminGenExpenses => "ADMIN_GEN_EXPENSES",
            ExpenseCategory::Salaries => "SALARIES",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Rent => "Rent",
            ExpenseCategory::UtilityBills => "Utility Bills",
            ExpenseCategory::AcademicExpenses => "Academic Expenses",
            ExpenseCategory::AdminGenExpenses => "Adm/ Gen Expenses",
            ExpenseCategory::Salaries => "Salaries",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = SchoolError;

    /// Accepts the wire code in any case, with `-` or `_` ("utility-bills").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        if normalized == "ADM_GEN_EXPENSES" {
            return Ok(ExpenseCategory::AdminGenExpenses);
        }
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.code() == normalized)
            .ok_or_else(|| {
                SchoolError::invalid(
                    "category",
                    s,
                    "use rent, utility-bills, academic-expenses, admin-gen-expenses or salaries",
                )
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub amount: Money,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: String,
}

impl Record for Expense {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn describe(&self) -> String {
        format!("expense #{}", self.id)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ExpenseInput {
    pub category: ExpenseCategory,
    pub amount: Money,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
