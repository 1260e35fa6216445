//! Non-fatal problems noticed while filtering or rendering.
//!
//! Each diagnostic is logged when recorded and also kept so the caller can show
//! it next to the results.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A record's date could not be parsed; the record was kept.
    UnparseableDate {
        record: String,
        field: &'static str,
        value: String,
    },
    /// A branding asset was missing or unreadable; the document was produced without it.
    AssetUnavailable { path: PathBuf, reason: String },
    /// A selected id had no loaded record and was skipped.
    SelectionSkipped { id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnparseableDate {
                record,
                field,
                value,
            } => write!(
                f,
                "{record}: could not parse {field} '{value}', kept in results"
            ),
            Diagnostic::AssetUnavailable { path, reason } => {
                write!(f, "logo {} omitted: {reason}", path.display())
            }
            Diagnostic::SelectionSkipped { id } => {
                write!(f, "record {id} is not loaded, skipped")
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::SelectionSkipped { .. } => log::debug!("{diagnostic}"),
            _ => log::warn!("{diagnostic}"),
        }
        self.entries.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
