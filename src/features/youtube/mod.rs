//! # YouTube Downloads
//!
//! The TUI talks to the downloader through [`VideoDownloader`] only. The
//! real implementation shells out to `yt-dlp` ([`YtDlp`]); tests swap in a
//! scripted fake.

pub mod ytdlp;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

pub use ytdlp::YtDlp;

/// Metadata reported by `yt-dlp -j`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Seconds. Live streams have none.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
}

impl VideoMetadata {
    /// Duration as `m:ss` (or `h:mm:ss`), `--:--` when unknown.
    pub fn duration_label(&self) -> String {
        let Some(duration) = self.duration else {
            return "--:--".to_string();
        };
        let total = duration.round() as u64;
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

#[derive(Debug)]
pub enum DownloadError {
    /// No usable yt-dlp binary was found.
    NotInstalled,
    Io(std::io::Error),
    /// yt-dlp ran but exited unsuccessfully.
    Process { status: Option<i32>, stderr: String },
    /// yt-dlp output was not the JSON we expected.
    Parse(serde_json::Error),
    /// Fetching the yt-dlp release failed.
    Http(String),
    UnsupportedPlatform(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::NotInstalled => write!(f, "yt-dlp is not installed"),
            DownloadError::Io(e) => write!(f, "I/O error: {e}"),
            DownloadError::Process { status, stderr } => {
                let detail = stderr.lines().last().unwrap_or("").trim();
                match status {
                    Some(code) if detail.is_empty() => write!(f, "yt-dlp exited with status {code}"),
                    Some(code) => write!(f, "yt-dlp exited with status {code}: {detail}"),
                    None => write!(f, "yt-dlp was terminated: {detail}"),
                }
            }
            DownloadError::Parse(e) => write!(f, "could not read yt-dlp output: {e}"),
            DownloadError::Http(msg) => write!(f, "download of yt-dlp failed: {msg}"),
            DownloadError::UnsupportedPlatform(os) => write!(f, "unsupported OS: {os}"),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<std::io::Error> for DownloadError {
    fn from(e: std::io::Error) -> Self {
        DownloadError::Io(e)
    }
}

#[async_trait]
pub trait VideoDownloader: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError>;

    /// Download `url` into `destination`, returning the directory written to.
    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, DownloadError>;

    async fn is_available(&self) -> bool;

    async fn install(&self) -> Result<(), DownloadError>;
}
