//! Global repeatcal configuration.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{CalError, CalResult};

static DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4097";
static DEFAULT_BIND_ADDR: &str = "127.0.0.1:4097";
static DEFAULT_LOG_LEVEL: &str = "info";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Configuration at ~/.config/repeatcal/config.toml
///
/// Every key can be overridden by an environment variable prefixed with
/// `REPEATCAL_`, e.g. `REPEATCAL_SERVER_URL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatcalConfig {
    /// Where the CLI reaches the event store
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Where repeatcal-server listens
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// tracing filter directive, e.g. "info" or "repeatcal_core=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Latest end date a recurring event may have
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_end_limit: Option<NaiveDate>,

    /// JSON file (`{ "events": [...] }`) the server starts from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl Default for RepeatcalConfig {
    fn default() -> Self {
        RepeatcalConfig {
            server_url: default_server_url(),
            bind_addr: default_bind_addr(),
            log_level: default_log_level(),
            repeat_end_limit: None,
            seed_file: None,
        }
    }
}

impl RepeatcalConfig {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalError::Config("Could not determine config directory".into()))?
            .join("repeatcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path. A missing file means defaults.
    pub fn load() -> CalResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> CalResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("REPEATCAL"))
            .build()
            .map_err(|e| CalError::Config(format!("Could not read {}: {e}", path.display())))?;

        settings
            .try_deserialize()
            .map_err(|e| CalError::Config(format!("Invalid config in {}: {e}", path.display())))
    }

    /// Write the current config to `path`.
    pub fn save_to(&self, path: &Path) -> CalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| CalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# repeatcal configuration

# Where the CLI reaches the event store:
# server_url = \"{DEFAULT_SERVER_URL}\"

# Where repeatcal-server listens:
# bind_addr = \"{DEFAULT_BIND_ADDR}\"

# Log filter (RUST_LOG takes precedence):
# log_level = \"{DEFAULT_LOG_LEVEL}\"

# Latest allowed end date for recurring events:
# repeat_end_limit = \"2025-12-31\"

# Events the server starts with:
# seed_file = \"/var/lib/repeatcal/events.json\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
