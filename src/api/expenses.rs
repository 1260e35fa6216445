use super::{not_found, ApiClient, Method};
use crate::error::Result;
use crate::models::{Expense, ExpenseInput};

const EXPENSES: &str = "/api/expenses/";

impl ApiClient {
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        self.get_json(EXPENSES)
    }

    pub fn get_expense(&self, id: i64) -> Result<Expense> {
        not_found(self.get_json(&format!("{EXPENSES}{id}/")), "Expense", id)
    }

    pub fn create_expense(&self, input: &ExpenseInput) -> Result<Expense> {
        self.send_json(Method::Post, EXPENSES, input)
    }

    pub fn update_expense(&self, id: i64, input: &ExpenseInput) -> Result<Expense> {
        not_found(
            self.send_json(Method::Put, &format!("{EXPENSES}{id}/"), input),
            "Expense",
            id,
        )
    }

    pub fn delete_expense(&self, id: i64) -> Result<()> {
        not_found(self.delete(&format!("{EXPENSES}{id}/")), "Expense", id)
    }
}
