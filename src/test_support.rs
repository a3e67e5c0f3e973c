//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::widgets::Paragraph;

use crate::features::image_convert::{ConvertError, IconConverter, IconSet};
use crate::features::youtube::{DownloadError, VideoDownloader, VideoMetadata};
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;
use crate::tui::page::{Command, Message, Outcome, Page, PageEvent, PageSummary};

pub use crate::tui::pages::{HOME, YOUTUBE_SET_URL as SET_URL};

/// A page that counts `init` calls and exposes a shared value.
///
/// Keys: Esc goes back, `q` quits, `+` increments, `s` opens [`SET_URL`].
/// Messages: `Blink(n)` stores `n`, `ClearAlert(_)` asks to go back (a
/// background result that closes the page).
///
/// Clones share their counters, so a test can keep one copy while the
/// navigator owns the other.
#[derive(Clone)]
pub struct CountingPage {
    title: String,
    inits: Arc<AtomicUsize>,
    value: Arc<AtomicU32>,
    init_commands: usize,
}

impl CountingPage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            inits: Arc::new(AtomicUsize::new(0)),
            value: Arc::new(AtomicU32::new(0)),
            init_commands: 0,
        }
    }

    pub fn with_init_commands(mut self, count: usize) -> Self {
        self.init_commands = count;
        self
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn value(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn set_value(&self, value: u32) {
        self.value.store(value, Ordering::SeqCst);
    }
}

impl Page for CountingPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn init(&mut self) -> Vec<Command> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        (0..self.init_commands)
            .map(|i| Command::After(Duration::from_millis(1), Message::Blink(i as u64)))
            .collect()
    }

    fn handle_event(&mut self, event: &PageEvent, _nav: &Navigator) -> Outcome {
        match event {
            PageEvent::Input(TuiEvent::Escape) => Outcome::back(),
            PageEvent::Input(TuiEvent::InputChar('q')) => Outcome::quit(),
            PageEvent::Input(TuiEvent::InputChar('+')) => {
                self.value.fetch_add(1, Ordering::SeqCst);
                Outcome::stay()
            }
            PageEvent::Input(TuiEvent::InputChar('s')) => Outcome::switch_to(SET_URL),
            PageEvent::Message(Message::Blink(n)) => {
                self.value.store(*n as u32, Ordering::SeqCst);
                Outcome::stay()
            }
            PageEvent::Message(Message::ClearAlert(_)) => Outcome::back(),
            _ => Outcome::stay(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _nav: &Navigator) {
        frame.render_widget(Paragraph::new(format!("{}={}", self.title, self.value())), area);
    }

    fn summary(&self) -> Option<PageSummary> {
        Some(PageSummary::Ready {
            label: self.title.clone(),
            value: self.value().to_string(),
        })
    }
}

/// Render a page into an in-memory terminal and return its text, one line per row.
pub fn render_page(page: &dyn Page, nav: &Navigator, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|f| page.render(f, f.area(), nav))
        .unwrap();
    buffer_text(&terminal)
}

pub fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scripted downloader: returns canned results and records calls.
#[derive(Default)]
pub struct FakeDownloader {
    pub metadata: Mutex<Option<Result<VideoMetadata, String>>>,
    pub downloads: Mutex<Vec<(String, PathBuf)>>,
    pub fail_download: Option<String>,
}

impl FakeDownloader {
    pub fn with_metadata(metadata: VideoMetadata) -> Self {
        Self {
            metadata: Mutex::new(Some(Ok(metadata))),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            metadata: Mutex::new(Some(Err(message.to_string()))),
            fail_download: Some(message.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl VideoDownloader for FakeDownloader {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch_metadata(&self, _url: &str) -> Result<VideoMetadata, DownloadError> {
        match self.metadata.lock().unwrap().clone() {
            Some(Ok(metadata)) => Ok(metadata),
            Some(Err(message)) => Err(DownloadError::Process {
                status: Some(1),
                stderr: message,
            }),
            None => Err(DownloadError::NotInstalled),
        }
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf, DownloadError> {
        if let Some(message) = &self.fail_download {
            return Err(DownloadError::Process {
                status: Some(1),
                stderr: message.clone(),
            });
        }
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));
        Ok(destination.to_path_buf())
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn install(&self) -> Result<(), DownloadError> {
        Ok(())
    }
}

/// Converter that records requests instead of touching the filesystem.
#[derive(Default)]
pub struct FakeConverter {
    pub requests: Mutex<Vec<(PathBuf, Vec<u32>)>>,
    pub fail: Option<String>,
}

impl IconConverter for FakeConverter {
    fn convert(&self, source: &Path, sizes: &[u32]) -> Result<IconSet, ConvertError> {
        self.requests
            .lock()
            .unwrap()
            .push((source.to_path_buf(), sizes.to_vec()));
        if let Some(message) = &self.fail {
            return Err(ConvertError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                message.clone(),
            )));
        }
        let dir = PathBuf::from("out");
        Ok(IconSet {
            files: sizes
                .iter()
                .map(|s| dir.join(format!("{s}x{s}.ico")))
                .collect(),
            dir,
        })
    }
}

pub fn sample_metadata() -> VideoMetadata {
    VideoMetadata {
        id: "Tkb2yVr8kfY".into(),
        title: "Sample Video".into(),
        description: "A test video".into(),
        duration: Some(212.0),
        view_count: Some(1234),
    }
}
