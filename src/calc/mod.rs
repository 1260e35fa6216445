//! Derived figures: fee totals and balances, dashboard health and trends.

pub mod fees;
pub mod ledger;

pub use fees::{balance, parse_assignment, total_fee, DraftField, FeeDraft};
pub use ledger::{dashboard, Dashboard, HealthBand, Metric, Ratio};
