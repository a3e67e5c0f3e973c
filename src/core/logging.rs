//! # Logging
//!
//! One append-only file per feature area under `logs/`:
//!
//! ```text
//! logs/
//! ├── main.log           everything not claimed below
//! ├── tui.log            sterben::tui::*
//! ├── youtube.log        sterben::features::youtube::*
//! └── image_convert.log  sterben::features::image_convert::*
//! ```
//!
//! Routing is done with simplelog target filters, so call sites just use the
//! `log` macros.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};

pub const LOGS_DIR: &str = "logs";

/// (feature name, module path prefix) for each dedicated log file.
pub const FEATURES: &[(&str, &str)] = &[
    ("tui", "sterben::tui"),
    ("youtube", "sterben::features::youtube"),
    ("image_convert", "sterben::features::image_convert"),
];

/// Catch-all feature for targets not listed in [`FEATURES`].
pub const MAIN_FEATURE: &str = "main";

#[derive(Debug)]
pub enum LogError {
    CreateDir(PathBuf, std::io::Error),
    OpenFile(PathBuf, std::io::Error),
    /// A global logger was already installed.
    Install(log::SetLoggerError),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::CreateDir(path, e) => {
                write!(f, "cannot create log directory {}: {e}", path.display())
            }
            LogError::OpenFile(path, e) => write!(f, "cannot open log file {}: {e}", path.display()),
            LogError::Install(e) => write!(f, "cannot install logger: {e}"),
        }
    }
}

impl std::error::Error for LogError {}

/// Path of the log file for `feature`.
pub fn log_path(dir: &Path, feature: &str) -> PathBuf {
    dir.join(format!("{feature}.log"))
}

fn open_append(path: PathBuf) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| LogError::OpenFile(path, e))
}

/// Build one logger per feature file. Split out from [`init`] so it can be
/// exercised without touching the global logger.
pub fn build_loggers(dir: &Path, level: LevelFilter) -> Result<Vec<Box<dyn SharedLogger>>, LogError> {
    fs::create_dir_all(dir).map_err(|e| LogError::CreateDir(dir.to_path_buf(), e))?;

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(FEATURES.len() + 1);

    for (feature, target) in FEATURES {
        let config = ConfigBuilder::new()
            .set_time_format_rfc3339()
            .add_filter_allow_str(*target)
            .build();
        let file = open_append(log_path(dir, feature))?;
        loggers.push(WriteLogger::new(level, config, file));
    }

    let mut main_config = ConfigBuilder::new();
    main_config.set_time_format_rfc3339();
    for (_, target) in FEATURES {
        main_config.add_filter_ignore_str(*target);
    }
    let file = open_append(log_path(dir, MAIN_FEATURE))?;
    loggers.push(WriteLogger::new(level, main_config.build(), file));

    Ok(loggers)
}

/// Install the per-feature file loggers as the global logger.
pub fn init(dir: &Path, level: LevelFilter) -> Result<(), LogError> {
    let loggers = build_loggers(dir, level)?;
    CombinedLogger::init(loggers).map_err(LogError::Install)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Record};

    fn emit(logger: &dyn SharedLogger, target: &str, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{message}"))
                .level(Level::Info)
                .target(target)
                .build(),
        );
        logger.flush();
    }

    #[test]
    fn test_creates_one_file_per_feature() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join(LOGS_DIR);

        let loggers = build_loggers(&logs, LevelFilter::Debug).unwrap();

        assert_eq!(loggers.len(), FEATURES.len() + 1);
        for (feature, _) in FEATURES {
            assert!(log_path(&logs, feature).exists());
        }
        assert!(log_path(&logs, MAIN_FEATURE).exists());
    }

    #[test]
    fn test_records_are_routed_by_target() {
        let dir = tempfile::tempdir().unwrap();
        let loggers = build_loggers(dir.path(), LevelFilter::Debug).unwrap();

        for logger in &loggers {
            emit(logger.as_ref(), "sterben::tui::navigator", "Added new page home");
            emit(logger.as_ref(), "sterben", "Config loaded");
        }

        let tui = fs::read_to_string(log_path(dir.path(), "tui")).unwrap();
        let main = fs::read_to_string(log_path(dir.path(), MAIN_FEATURE)).unwrap();
        let youtube = fs::read_to_string(log_path(dir.path(), "youtube")).unwrap();
        assert!(tui.contains("Added new page home"));
        assert!(!tui.contains("Config loaded"));
        assert!(main.contains("Config loaded"));
        assert!(!main.contains("Added new page home"));
        assert!(youtube.is_empty());
    }

    #[test]
    fn test_files_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(dir.path(), MAIN_FEATURE);
        fs::write(&path, "previous run\n").unwrap();

        let loggers = build_loggers(dir.path(), LevelFilter::Info).unwrap();
        for logger in &loggers {
            emit(logger.as_ref(), "sterben", "second run");
        }

        let main = fs::read_to_string(path).unwrap();
        assert!(main.starts_with("previous run\n"));
        assert!(main.contains("second run"));
    }

    #[test]
    fn test_uncreatable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = build_loggers(&blocker.join("logs"), LevelFilter::Info).err().unwrap();
        assert!(matches!(err, LogError::CreateDir(_, _)));
    }
}
