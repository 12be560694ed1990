//! Configuration loading and resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! POS credentials are the exception: they are read from the environment
//! (or the config file for the base URL) and have no compiled default.

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable names
pub const ENV_PORT: &str = "GREENRACK_PORT";
pub const ENV_DATABASE: &str = "GREENRACK_DATABASE";
pub const ENV_POS_BASE_URL: &str = "GREENRACK_POS_BASE_URL";
pub const ENV_POS_AUTH: &str = "GREENRACK_POS_AUTH";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5680;

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub pos: PosSettings,
}

/// Connection settings for the external POS platform
#[derive(Debug, Clone)]
pub struct PosSettings {
    pub base_url: String,
    /// Value sent verbatim in the Authorization header
    pub auth_token: String,
}

/// Resolve the full service configuration.
///
/// `cli_port` and `cli_database` come from the binary's argument parser and
/// take precedence over everything else.
pub fn resolve(cli_port: Option<u16>, cli_database: Option<PathBuf>) -> Result<Config> {
    let file = load_config_file();

    let port = cli_port
        .or_else(|| {
            std::env::var(ENV_PORT)
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
        })
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.get("port"))
                .and_then(|v| v.as_integer())
                .and_then(|v| u16::try_from(v).ok())
        })
        .unwrap_or(DEFAULT_PORT);

    let database_path = cli_database
        .or_else(|| std::env::var(ENV_DATABASE).ok().map(PathBuf::from))
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.get("database_path"))
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        })
        .unwrap_or_else(default_database_path);

    let pos_base_url = std::env::var(ENV_POS_BASE_URL)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| {
            file.as_ref()
                .and_then(|f| f.get("pos"))
                .and_then(|v| v.get("base_url"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .ok_or_else(|| {
            Error::Config(format!(
                "POS base URL not configured (set {} or [pos].base_url in config.toml)",
                ENV_POS_BASE_URL
            ))
        })?;

    let pos_auth = std::env::var(ENV_POS_AUTH)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            Error::Config(format!("POS auth token not configured (set {})", ENV_POS_AUTH))
        })?;

    Ok(Config {
        host: DEFAULT_HOST.to_string(),
        port,
        database_path,
        pos: PosSettings {
            base_url: pos_base_url,
            auth_token: pos_auth,
        },
    })
}

/// Load the optional TOML config file, if one exists.
///
/// Looks in the user config directory first, then (on Linux) the system
/// location /etc/greenrack/config.toml.
fn load_config_file() -> Option<toml::Value> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("greenrack").join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc/greenrack/config.toml"));
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<toml::Value>(&content) {
                Ok(value) => return Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring malformed config file {}: {}", path.display(), e);
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config file {}: {}", path.display(), e);
            }
        }
    }

    None
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("greenrack"))
        .unwrap_or_else(|| PathBuf::from("./greenrack_data"))
        .join("catalog.db")
}
