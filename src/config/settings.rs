use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub school: SchoolSettings,
    #[serde(default)]
    pub challan: ChallanSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub token: Option<String>,
    /// Extra headers attached to every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Largest response body accepted, in MiB. List endpoints return whole collections.
    #[serde(default = "default_max_response_mb")]
    pub max_response_mb: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: default_timeout(),
            token: None,
            headers: BTreeMap::new(),
            max_response_mb: default_max_response_mb(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_response_mb() -> u64 {
    512
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchoolSettings {
    pub name: String,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            name: "School".to_string(),
            footer: None,
            currency_symbol: default_currency(),
            logo: None,
        }
    }
}

fn default_currency() -> String {
    "Rs.".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChallanSettings {
    #[serde(default = "default_due_days")]
    pub due_days: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Descriptions equal to this value are not printed as a note.
    #[serde(default = "default_placeholder")]
    pub placeholder_note: String,
}

impl Default for ChallanSettings {
    fn default() -> Self {
        Self {
            due_days: default_due_days(),
            output_dir: default_output_dir(),
            placeholder_note: default_placeholder(),
        }
    }
}

fn default_due_days() -> u32 {
    10
}

fn default_output_dir() -> String {
    "challans".to_string()
}

fn default_placeholder() -> String {
    "na".to_string()
}
