mod settings;

pub use settings::{ApiSettings, ChallanSettings, Config, SchoolSettings};

use crate::error::{Result, SchoolError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, else ~/.school-admin/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "school-admin") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        SchoolError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".school-admin"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve a configured path; relative paths are taken from the config directory.
pub fn resolve_path(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(SchoolError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(SchoolError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    parse_config(&content).map_err(|e| SchoolError::ConfigParse { path, source: e })
}

pub fn parse_config(content: &str) -> std::result::Result<Config, toml::de::Error> {
    toml::from_str(content)
}

/// Create the config directory with a template config.toml
pub fn init_config_dir(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(SchoolError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("challans"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8000"
timeout_secs = 30
max_response_mb = 512            # list endpoints return whole collections
# token = "..."                  # optional, sent as "Authorization: Bearer <token>"

# [api.headers]                  # optional extra headers on every request
# X-Campus = "main"

[school]
name = "KNOWLEDGE WAVE"
footer = "Knowledge Wave School Management System"
currency_symbol = "Rs."
# logo = "logo.png"              # PNG printed on challans; relative to this directory

[challan]
due_days = 10
output_dir = "challans"          # relative to this directory, or absolute / ~/...
placeholder_note = "na"          # fee descriptions equal to this are not printed
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn template_parses_with_expected_defaults() {
        let config = parse_config(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.challan.due_days, 10);
        assert_eq!(config.challan.placeholder_note, "na");
        assert!(config.school.logo.is_none());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = parse_config("[school]\nname = \"Test School\"\n").unwrap();
        assert_eq!(config.school.currency_symbol, "Rs.");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.max_response_mb, 512);
        assert_eq!(config.challan.output_dir, "challans");
    }

    #[test]
    fn init_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("cfg");
        init_config_dir(&dir).unwrap();
        assert!(dir.join("challans").is_dir());
        assert!(load_config(&dir).is_ok());
        assert!(matches!(
            init_config_dir(&dir),
            Err(SchoolError::AlreadyInitialized(_))
        ));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let base = Path::new("/etc/school");
        assert_eq!(resolve_path("logo.png", base), PathBuf::from("/etc/school/logo.png"));
        assert_eq!(resolve_path("/srv/out", base), PathBuf::from("/srv/out"));
    }
}
