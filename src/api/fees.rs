use super::{not_found, ApiClient, Method};
use crate::error::Result;
use crate::models::{FeeGeneration, FeeSubmission, StudentFee};

const FEES: &str = "/api/studentfees/";
const FEE_UPDATE: &str = "/api/feeupdate/";
const FEE_GENERATION: &str = "/api/feegen/";

impl ApiClient {
    pub fn list_fees(&self) -> Result<Vec<StudentFee>> {
        self.get_json(FEES)
    }

    pub fn get_fee(&self, id: i64) -> Result<StudentFee> {
        not_found(self.get_json(&format!("{FEES}{id}/")), "Fee record", id)
    }

    pub fn create_fee(&self, submission: &FeeSubmission) -> Result<StudentFee> {
        self.send_json(Method::Post, FEES, submission)
    }

    /// Edits go through the dedicated update endpoint, which accepts every column.
    pub fn update_fee(&self, id: i64, submission: &FeeSubmission) -> Result<serde_json::Value> {
        not_found(
            self.send_json(Method::Put, &format!("{FEE_UPDATE}{id}/"), submission),
            "Fee record",
            id,
        )
    }

    pub fn delete_fee(&self, id: i64) -> Result<()> {
        not_found(self.delete(&format!("{FEES}{id}/")), "Fee record", id)
    }

    /// Creates a fee row for every enrolled student.
    pub fn generate_fees(&self, request: &FeeGeneration) -> Result<()> {
        let _: serde_json::Value = self.send_json(Method::Post, FEE_GENERATION, request)?;
        Ok(())
    }
}
