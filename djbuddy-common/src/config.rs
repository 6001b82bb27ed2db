//! Configuration loading and Mixxx database discovery
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Clap covers tiers 1 and 2 for the numeric settings. The database path is
//! resolved here in full because its compiled default is OS-dependent.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the Mixxx database location
pub const DATABASE_ENV_VAR: &str = "DJBUDDY_DATABASE";

/// HTTP port for the publish API and display page
pub const DEFAULT_PORT: u16 = 8080;

/// Wait between successful poll cycles
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Wait after a failed poll cycle (replaces the normal interval for that cycle)
pub const DEFAULT_ERROR_BACKOFF_MS: u64 = 5000;

/// Optional settings read from `config.toml`
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub poll_interval_ms: Option<u64>,
    pub error_backoff_ms: Option<u64>,
}

impl TomlConfig {
    /// Parse a config file, failing on I/O or TOML errors
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load the config file, degrading to defaults
    ///
    /// A missing file is normal and yields defaults silently. A file that exists
    /// but cannot be read or parsed is reported with a warning and ignored.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match default_config_file() {
                Some(path) => path,
                None => {
                    debug!("No config file found, using defaults");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            debug!("Config file {} does not exist, using defaults", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                debug!("Loaded config file {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Values supplied on the command line or via environment (clap tiers)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub port: Option<u16>,
    pub poll_interval_ms: Option<u64>,
    pub error_backoff_ms: Option<u64>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub port: u16,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
}

impl Settings {
    /// Merge overrides over the config file over compiled defaults
    ///
    /// Fails if an interval is zero or the database file does not exist.
    pub fn resolve(overrides: Overrides, file: &TomlConfig) -> Result<Self> {
        let database_path = resolve_database_path(overrides.database.as_deref(), file)?;
        if !database_path.exists() {
            return Err(Error::DatabaseNotFound(database_path));
        }

        let poll_interval_ms = overrides
            .poll_interval_ms
            .or(file.poll_interval_ms)
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
        let error_backoff_ms = overrides
            .error_backoff_ms
            .or(file.error_backoff_ms)
            .unwrap_or(DEFAULT_ERROR_BACKOFF_MS);

        if poll_interval_ms == 0 {
            return Err(Error::Config("poll interval must be greater than zero".to_string()));
        }
        if error_backoff_ms == 0 {
            return Err(Error::Config("error backoff must be greater than zero".to_string()));
        }

        let settings = Self {
            database_path,
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            poll_interval: Duration::from_millis(poll_interval_ms),
            error_backoff: Duration::from_millis(error_backoff_ms),
        };

        if settings.backoff_shorter_than_interval() {
            warn!(
                "Error backoff ({}ms) is shorter than the poll interval ({}ms); failed polls will retry faster than normal ones",
                error_backoff_ms, poll_interval_ms
            );
        }

        Ok(settings)
    }

    /// True when a failed poll would be retried sooner than a successful one
    pub fn backoff_shorter_than_interval(&self) -> bool {
        self.error_backoff < self.poll_interval
    }
}

/// Resolve the Mixxx database path (CLI → env → TOML → OS default)
///
/// Does not check that the file exists.
pub fn resolve_database_path(cli_arg: Option<&Path>, file: &TomlConfig) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    if let Some(path) = &file.database_path {
        return Ok(path.clone());
    }

    default_database_path()
        .ok_or_else(|| Error::Config("Could not determine Mixxx settings directory".to_string()))
}

/// Where Mixxx keeps `mixxxdb.sqlite` on this platform
pub fn default_database_path() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|d| {
            d.join("Library")
                .join("Application Support")
                .join("Mixxx")
                .join("mixxxdb.sqlite")
        })
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\Mixxx
        dirs::data_local_dir().map(|d| d.join("Mixxx").join("mixxxdb.sqlite"))
    } else {
        dirs::home_dir().map(|d| d.join(".mixxx").join("mixxxdb.sqlite"))
    }
}

/// First existing config file for the platform
fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("djbuddy").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/djbuddy/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
