//! In-memory filtering and aggregation over fetched collections.
//!
//! Every list is fetched whole and filtered locally. Criteria are plain structs of
//! optional predicates; an inactive predicate matches everything and all active
//! ones are ANDed. Results keep the source order. Aggregates are computed from the
//! filtered rows only.

mod expenses;
mod fees;
mod payments;
mod predicate;
mod students;
mod teachers;

pub use expenses::{ExpenseCriteria, ExpenseSummary};
pub use fees::{FeeCriteria, FeeSummary};
pub use payments::{PaymentCriteria, PaymentSummary};
pub use predicate::{DateCheck, DateRange, Exact, NumRange, TextFilter, TriState};
pub use students::{StudentCriteria, StudentSummary};
pub use teachers::{TeacherCriteria, TeacherSummary};

use crate::dates::YearMonth;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::models::Record;

/// Filter criteria for one record type, plus the totals shown under its table.
pub trait Criteria<T> {
    type Summary;

    /// Whether `record` passes every active predicate. Unreadable dates are
    /// reported to `diagnostics` and treated as a match.
    fn matches(&self, record: &T, diagnostics: &mut Diagnostics) -> bool;

    /// True when no predicate is active.
    fn is_empty(&self) -> bool;

    fn summarize(rows: &[&T]) -> Self::Summary;
}

/// Result of a full filtering pass.
#[derive(Debug, Clone)]
pub struct Filtered<T> {
    pub records: Vec<T>,
    pub diagnostics: Diagnostics,
}

/// Positions of the matching records, in source order.
pub fn filter_indices<T, C: Criteria<T>>(
    records: &[T],
    criteria: &C,
    diagnostics: &mut Diagnostics,
) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record, diagnostics))
        .map(|(i, _)| i)
        .collect()
}

pub fn filter_records<T: Clone, C: Criteria<T>>(records: &[T], criteria: &C) -> Filtered<T> {
    let mut diagnostics = Diagnostics::new();
    let records = filter_indices(records, criteria, &mut diagnostics)
        .into_iter()
        .map(|i| records[i].clone())
        .collect();
    Filtered {
        records,
        diagnostics,
    }
}

/// Date-range test that keeps records whose date cannot be read.
fn date_in_range<R: Record>(
    range: &DateRange,
    record: &R,
    field: &'static str,
    raw: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    match range.check(raw) {
        DateCheck::Inside => true,
        DateCheck::Outside => false,
        DateCheck::Unparseable => {
            diagnostics.record(Diagnostic::UnparseableDate {
                record: record.describe(),
                field,
                value: raw.to_string(),
            });
            true
        }
    }
}

/// Calendar-month test with the same fail-open rule.
fn month_matches<R: Record>(
    wanted: Option<YearMonth>,
    record: &R,
    raw: &str,
    diagnostics: &mut Diagnostics,
) -> bool {
    let Some(wanted) = wanted else {
        return true;
    };
    match YearMonth::of_record(raw) {
        Some(month) => month == wanted,
        None => {
            diagnostics.record(Diagnostic::UnparseableDate {
                record: record.describe(),
                field: "month",
                value: raw.to_string(),
            });
            true
        }
    }
}
