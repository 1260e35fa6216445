use super::ApiClient;
use crate::error::Result;
use crate::models::LedgerEntry;

impl ApiClient {
    pub fn list_ledger(&self) -> Result<Vec<LedgerEntry>> {
        self.get_json("/api/ledger/")
    }
}
