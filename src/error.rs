use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchoolError {
    #[error("Config directory not found at {0}. Run 'school init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    /// No response was received at all.
    #[error("Network error contacting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// The backend answered with a 5xx status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The backend answered with a 4xx status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid assignment '{0}'. Expected 'field=value' (e.g., 'exam_fee=500')")]
    InvalidAssignment(String),

    #[error("Unknown fee field '{0}'")]
    UnknownFeeField(String),

    #[error("No fee records selected. Pass record ids or --all.")]
    NothingSelected,

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchoolError {
    pub fn invalid(field: &str, value: &str, reason: &str) -> Self {
        SchoolError::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures where no HTTP response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, SchoolError::Network { .. })
    }

    pub fn is_server(&self) -> bool {
        matches!(self, SchoolError::Server { .. })
    }
}

pub type Result<T> = std::result::Result<T, SchoolError>;
