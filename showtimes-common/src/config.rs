//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration lives in a small TOML file. Everything in it is
//! optional; a missing file means built-in defaults.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. `SHOWTIMES_ROOT_FOLDER` environment variable
//! 3. `root_folder` in the TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::theaters::Theater;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "SHOWTIMES_ROOT_FOLDER";

/// Environment variable pointing at an alternate config file
pub const CONFIG_FILE_ENV: &str = "SHOWTIMES_CONFIG";

/// Database file name inside the root folder
pub const DATABASE_FILENAME: &str = "showtimes.db";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder for the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database file; defaults to `<root>/showtimes.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Digest mail settings (optional)
    #[serde(default)]
    pub mail: MailConfig,

    /// Additional or overriding theaters
    #[serde(default)]
    pub theaters: Vec<Theater>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Sender and recipient of the emailed digest
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub sender: Option<String>,

    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    #[serde(default)]
    pub receiver: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: None,
            sender_name: default_sender_name(),
            receiver: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sender_name() -> String {
    "Test Movie Sender".to_string()
}

impl TomlConfig {
    /// Parse a config file; errors if it is missing or malformed
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `path` (or the default location), falling back to defaults
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            warn!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Default config file location
///
/// `SHOWTIMES_CONFIG` wins, otherwise `<config dir>/showtimes/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("showtimes").join("config.toml"))
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: default_log_level(),
        }
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/showtimes (or /var/lib/showtimes for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("showtimes"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/showtimes"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/showtimes
        dirs::data_dir()
            .map(|d| d.join("showtimes"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/showtimes"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\showtimes
        dirs::data_local_dir()
            .map(|d| d.join("showtimes"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\showtimes"))
    } else {
        PathBuf::from("./showtimes_data")
    }
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone, Default)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    config_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Priority 1: command-line argument
    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    /// Priority 3: TOML `root_folder`
    pub fn with_config(mut self, config: &TomlConfig) -> Self {
        self.config_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.is_empty() {
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.config_root {
            return path.clone();
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder and derives file locations inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Create the root folder if needed (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILENAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

/// Database location: explicit `database_path` or `<root>/showtimes.db`
pub fn resolve_database_path(config: &TomlConfig, root_folder: &Path) -> PathBuf {
    config
        .database_path
        .clone()
        .unwrap_or_else(|| root_folder.join(DATABASE_FILENAME))
}
