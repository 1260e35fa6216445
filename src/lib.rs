pub mod api;
pub mod calc;
pub mod challan;
pub mod config;
pub mod dates;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod models;
pub mod money;
pub mod pdf;
pub mod view;

pub use api::ApiClient;
pub use config::{Config, ApiSettings, SchoolSettings, ChallanSettings};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{SchoolError, Result};
pub use money::Money;
pub use view::ListView;
