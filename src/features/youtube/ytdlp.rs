//! yt-dlp process wrapper.
//!
//! Lookup order: the configured program (or `yt-dlp` on PATH), then a copy
//! in the install directory. [`YtDlp::install`] fetches the latest release
//! into that directory when neither works.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::RwLock;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;

use super::{DownloadError, VideoDownloader, VideoMetadata};

pub const DOWNLOAD_UNIX_BINARY: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp";
pub const DOWNLOAD_WINDOWS_EXE: &str =
    "https://github.com/yt-dlp/yt-dlp/releases/latest/download/yt-dlp.exe";

const DEFAULT_PROGRAM: &str = "yt-dlp";
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

pub struct YtDlp {
    program: RwLock<PathBuf>,
    install_dir: PathBuf,
    release_url: Option<String>,
    client: reqwest::Client,
}

fn binary_name() -> &'static str {
    if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" }
}

impl YtDlp {
    /// `program` of `None` means `yt-dlp` from PATH.
    pub fn new(program: Option<PathBuf>) -> Self {
        Self {
            program: RwLock::new(program.unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM))),
            install_dir: PathBuf::from("."),
            release_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Directory that [`install`](VideoDownloader::install) writes into.
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    /// Override the release URL (mirrors, tests).
    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.release_url = Some(url.into());
        self
    }

    /// The program currently used to run yt-dlp.
    pub fn program(&self) -> PathBuf {
        self.program
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_program(&self, program: PathBuf) {
        info!("Using yt-dlp at {}", program.display());
        *self.program.write().unwrap_or_else(|e| e.into_inner()) = program;
    }

    fn local_binary(&self) -> PathBuf {
        self.install_dir.join(binary_name())
    }

    fn release_url(&self) -> Result<String, DownloadError> {
        if let Some(url) = &self.release_url {
            return Ok(url.clone());
        }
        match std::env::consts::OS {
            "windows" => Ok(DOWNLOAD_WINDOWS_EXE.to_string()),
            "linux" | "macos" => Ok(DOWNLOAD_UNIX_BINARY.to_string()),
            other => Err(DownloadError::UnsupportedPlatform(other.to_string())),
        }
    }

    async fn probe(program: &Path) -> bool {
        let status = Command::new(program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("yt-dlp probe of {} failed: {}", program.display(), e);
                false
            }
        }
    }

    async fn ensure_available(&self) -> Result<PathBuf, DownloadError> {
        if self.is_available().await {
            Ok(self.program())
        } else {
            Err(DownloadError::NotInstalled)
        }
    }

    /// Run yt-dlp to completion, mapping a failed exit to `DownloadError::Process`.
    async fn run(&self, program: &Path, args: &[&OsStr]) -> Result<Vec<u8>, DownloadError> {
        debug!("Running {} {:?}", program.display(), args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(
                "yt-dlp failed with status {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
            return Err(DownloadError::Process {
                status: output.status.code(),
                stderr,
            });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl VideoDownloader for YtDlp {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        let program = self.ensure_available().await?;
        info!("Fetching metadata for {}", url);
        let stdout = self
            .run(&program, &[OsStr::new("-j"), OsStr::new("--no-playlist"), OsStr::new(url)])
            .await?;
        // One JSON document per line; only the first entry matters.
        let first = stdout
            .split(|b| *b == b'\n')
            .find(|line| !line.is_empty())
            .unwrap_or(&[]);
        let metadata: VideoMetadata = serde_json::from_slice(first).map_err(DownloadError::Parse)?;
        info!("Fetched metadata: {} ({})", metadata.title, metadata.id);
        Ok(metadata)
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, DownloadError> {
        let program = self.ensure_available().await?;
        tokio::fs::create_dir_all(destination).await?;
        let template = destination.join(OUTPUT_TEMPLATE);
        info!("Downloading {} into {}", url, destination.display());
        self.run(&program, &[OsStr::new("-o"), template.as_os_str(), OsStr::new(url)])
            .await?;
        info!("Download of {} finished", url);
        Ok(destination.to_path_buf())
    }

    async fn is_available(&self) -> bool {
        if Self::probe(&self.program()).await {
            return true;
        }
        let local = self.local_binary();
        if local.exists() && Self::probe(&local).await {
            self.set_program(local);
            return true;
        }
        false
    }

    async fn install(&self) -> Result<(), DownloadError> {
        let url = self.release_url()?;
        info!("Installing yt-dlp from {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DownloadError::Http(e.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::Http(e.to_string()))?;

        tokio::fs::create_dir_all(&self.install_dir).await?;
        let target = self.local_binary();
        tokio::fs::write(&target, &bytes).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).await?;
        }

        info!("Installed yt-dlp ({} bytes) at {}", bytes.len(), target.display());
        self.set_program(target);
        Ok(())
    }
}
