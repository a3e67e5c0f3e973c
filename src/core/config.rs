//! # Configuration
//!
//! A single flat JSON file (`config.json` in the working directory).
//!
//! ```json
//! {
//!   "download_dir": "downloads",
//!   "icon_sizes": [16, 24, 32, 48, 64, 128, 256],
//!   "ytdlp_path": "",
//!   "log_level": "debug"
//! }
//! ```
//!
//! Keys missing from an existing file are added back with the zero value of
//! their type and the file is rewritten. Zero values mean "use the default",
//! which `resolve()` fills in.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::features::image_convert::DEFAULT_SIZES;

pub const CONFIG_FILE: &str = "config.json";

// ============================================================================
// Config Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    pub download_dir: String,
    pub icon_sizes: Vec<u32>,
    pub ytdlp_path: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: DEFAULT_DOWNLOAD_DIR.to_string(),
            icon_sizes: DEFAULT_SIZES.to_vec(),
            ytdlp_path: String::new(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";
pub const DEFAULT_LOG_LEVEL: &str = "debug";

/// Zero value for each key, used when backfilling.
const ZERO_VALUES: &[(&str, fn() -> Value)] = &[
    ("download_dir", || Value::String(String::new())),
    ("icon_sizes", || Value::Array(Vec::new())),
    ("ytdlp_path", || Value::String(String::new())),
    ("log_level", || Value::String(String::new())),
];

// ============================================================================
// Resolved Config (concrete values, no zero placeholders)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub download_dir: PathBuf,
    pub icon_sizes: Vec<u32>,
    /// `None` = look up `yt-dlp` on PATH.
    pub ytdlp_path: Option<PathBuf>,
    pub log_level: log::LevelFilter,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// The file parsed, but not as a JSON object.
    NotAnObject,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::NotAnObject => write!(f, "config parse error: expected a JSON object"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading / Saving
// ============================================================================

/// Load the config at `path`.
///
/// A missing or empty file is (re)written with defaults. Missing keys are
/// backfilled with zero values and written back.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        let config = Config::default();
        save(path, &config)?;
        return Ok(config);
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    if contents.trim().is_empty() {
        warn!("Config file {} is empty, writing defaults", path.display());
        let config = Config::default();
        save(path, &config)?;
        return Ok(config);
    }

    let mut raw = match serde_json::from_str::<Value>(&contents).map_err(ConfigError::Parse)? {
        Value::Object(map) => map,
        _ => return Err(ConfigError::NotAnObject),
    };

    if backfill_missing_keys(&mut raw) {
        info!("Config file {} was missing keys, rewriting", path.display());
        write_json(path, &Value::Object(raw.clone()))?;
    }

    let config: Config =
        serde_json::from_value(Value::Object(raw)).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Write `config` to `path`, pretty-printed.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let value = serde_json::to_value(config).map_err(ConfigError::Parse)?;
    write_json(path, &value)
}

fn write_json(path: &Path, value: &Value) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(ConfigError::Parse)?;
    fs::write(path, json).map_err(ConfigError::Io)
}

/// Insert zero values for absent keys. Returns `true` if anything was added.
fn backfill_missing_keys(raw: &mut Map<String, Value>) -> bool {
    let mut updated = false;
    for (key, zero) in ZERO_VALUES {
        if !raw.contains_key(*key) {
            debug!("Backfilling config key {}", key);
            raw.insert((*key).to_string(), zero());
            updated = true;
        }
    }
    updated
}

// ============================================================================
// Resolution
// ============================================================================

/// Replace zero values with defaults.
pub fn resolve(config: &Config) -> ResolvedConfig {
    let download_dir = if config.download_dir.trim().is_empty() {
        PathBuf::from(DEFAULT_DOWNLOAD_DIR)
    } else {
        PathBuf::from(&config.download_dir)
    };

    let icon_sizes = if config.icon_sizes.is_empty() {
        DEFAULT_SIZES.to_vec()
    } else {
        config.icon_sizes.clone()
    };

    let ytdlp_path = Some(config.ytdlp_path.trim())
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    let log_level = config
        .log_level
        .trim()
        .parse()
        .unwrap_or_else(|_| {
            if !config.log_level.trim().is_empty() {
                warn!("Unknown log level {:?}, using {}", config.log_level, DEFAULT_LOG_LEVEL);
            }
            log::LevelFilter::Debug
        });

    ResolvedConfig {
        download_dir,
        icon_sizes,
        ytdlp_path,
        log_level,
    }
}
