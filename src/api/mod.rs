//! Backend REST access: one client plus a request builder per resource.

mod client;
mod expenses;
mod fees;
mod ledger;
mod multipart;
mod students;
mod teachers;

pub use client::{error_message, ApiClient, Method};
pub use multipart::Multipart;

use crate::error::{Result, SchoolError};

/// Turn a 404 from a detail endpoint into a `NotFound` naming the record.
fn not_found<T>(result: Result<T>, entity: &'static str, id: i64) -> Result<T> {
    match result {
        Err(SchoolError::Rejected { status: 404, .. }) => Err(SchoolError::NotFound {
            entity,
            id: id.to_string(),
        }),
        other => other,
    }
}
