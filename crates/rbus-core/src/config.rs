//! Environment Configuration Loader
//!
//! Loads environment variables from the canonical location: `/etc/rbus/environment`
//! and resolves them into a [`DumpConfig`]. Command-line flags are layered on
//! top of the result by the binary.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rbus_core::config::{load_environment, DumpConfig};
//!
//! load_environment();
//! let config = DumpConfig::from_env().expect("valid RBUS_* variables");
//! assert_eq!(config.service.is_empty(), false);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::BusType;

/// Alternative paths to check (in order of priority)
pub const ENV_FILE_PATHS: &[&str] = &["/etc/rbus/environment", ".env"];

/// Service introspected when none is configured
pub const DEFAULT_SERVICE: &str = "org.bluez";

/// Object path the recursive tree dump starts from
pub const DEFAULT_ROOT: &str = "/";

/// Load environment variables from the canonical configuration file.
///
/// `$RBUS_ENV_FILE` wins if set, then [`ENV_FILE_PATHS`] in order. Existing
/// environment variables are never overridden.
///
/// Returns the path that was loaded, or None if no file was found.
pub fn load_environment() -> Option<String> {
    if let Ok(custom_path) = std::env::var("RBUS_ENV_FILE") {
        if let Some(path) = try_load_env_file(&custom_path) {
            return Some(path);
        }
    }

    for path in ENV_FILE_PATHS {
        if let Some(loaded_path) = try_load_env_file(path) {
            return Some(loaded_path);
        }
    }

    debug!("No environment file found, using existing environment");
    None
}

fn try_load_env_file(path: &str) -> Option<String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return None;
    }

    match fs::read_to_string(path_obj) {
        Ok(content) => {
            let mut loaded_count = 0;
            let mut skipped_count = 0;

            for line in content.lines() {
                let line = line.trim();

                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                if let Some((key, value)) = parse_env_line(line) {
                    if std::env::var(&key).is_err() {
                        std::env::set_var(&key, &value);
                        loaded_count += 1;
                        debug!("Loaded: {}={}", key, value);
                    } else {
                        skipped_count += 1;
                        debug!("Skipped (already set): {}", key);
                    }
                }
            }

            info!(
                "Loaded {} environment variables from {} ({} skipped - already set)",
                loaded_count, path, skipped_count
            );

            Some(path.to_string())
        }
        Err(e) => {
            warn!("Failed to read environment file {}: {}", path, e);
            None
        }
    }
}

/// Parse a single environment line into key-value pair.
fn parse_env_line(line: &str) -> Option<(String, String)> {
    // KEY=VALUE, KEY="VALUE", KEY='VALUE'
    let mut parts = line.splitn(2, '=');
    let key = parts.next()?.trim();
    let value = parts.next()?.trim();

    if key.is_empty() {
        return None;
    }

    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);

    Some((key.to_string(), value.to_string()))
}

/// Get a configuration value with a default.
pub fn get_config(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional configuration value.
pub fn get_config_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get a boolean configuration value.
pub fn get_config_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(default)
}

/// Settings for one dump run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// SSH destination host; `None` means the local bus
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity: Option<PathBuf>,
    /// Bus name whose object tree is introspected
    pub service: String,
    /// Object path the tree dump starts from
    pub root: String,
    pub bus: BusType,
    /// Directory the per-interface XML files are written to
    pub output_dir: PathBuf,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            port: None,
            identity: None,
            service: DEFAULT_SERVICE.to_string(),
            root: DEFAULT_ROOT.to_string(),
            bus: BusType::System,
            output_dir: PathBuf::from("."),
        }
    }
}

impl DumpConfig {
    /// Read `RBUS_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let port = match get_config_opt("RBUS_PORT") {
            Some(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|e| Error::config(format!("RBUS_PORT={}: {}", raw, e)))?,
            ),
            None => None,
        };

        let bus = if get_config_bool("RBUS_SESSION_BUS", false) {
            BusType::Session
        } else {
            BusType::System
        };

        Ok(Self {
            host: get_config_opt("RBUS_HOST"),
            user: get_config_opt("RBUS_USER"),
            port,
            identity: get_config_opt("RBUS_IDENTITY").map(PathBuf::from),
            service: get_config("RBUS_SERVICE", DEFAULT_SERVICE),
            root: get_config("RBUS_ROOT", DEFAULT_ROOT),
            bus,
            output_dir: PathBuf::from(get_config("RBUS_OUTPUT_DIR", ".")),
        })
    }

    /// SSH destination in `user@host` form, if a host is configured.
    pub fn destination(&self) -> Option<String> {
        self.host.as_ref().map(|host| match &self.user {
            Some(user) => format!("{}@{}", user, host),
            None => host.clone(),
        })
    }
}
