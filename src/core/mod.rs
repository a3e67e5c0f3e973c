//! # Core Services
//!
//! Startup services with no knowledge of the terminal UI.
//!
//! ```text
//!     main ──▶ logging::init ──▶ config::load ──▶ config::resolve ──▶ tui::run
//! ```
//!
//! ## Modules
//!
//! - [`config`]: the JSON config file (load, backfill, save, resolve)
//! - [`logging`]: per-feature log files under `logs/`

pub mod config;
pub mod logging;
