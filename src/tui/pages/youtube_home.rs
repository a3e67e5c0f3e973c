//! # YouTube Home Page
//!
//! Menu for the download flow. The video to download comes from the
//! set-url page's summary; this page never holds a URL of its own.
//!
//! Alerts ("Downloaded!", errors) are transient: each one bumps the alert
//! generation and schedules a `ClearAlert` for it, so an older timer never
//! clears a newer alert.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ALERT_DURATION, YOUTUBE_SET_URL, centered_panel_area, hints, panel};
use crate::features::youtube::VideoDownloader;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{Menu, MenuEvent, MenuState};
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;
use crate::tui::page::{Command, Message, Outcome, Page, PageEvent, PageSummary};

pub const NO_METADATA: &str = "No metadata available";
pub const DOWNLOADING: &str = "Downloading...";
pub const DOWNLOADED: &str = "Downloaded!";

const SET_URL_ENTRY: usize = 0;
const DOWNLOAD_ENTRY: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Alert {
    text: String,
    is_error: bool,
}

pub struct YouTubeHomePage {
    menu: MenuState,
    downloader: Arc<dyn VideoDownloader>,
    download_dir: PathBuf,
    alert: Option<Alert>,
    alert_generation: u64,
    downloading: bool,
    request: u64,
}

impl YouTubeHomePage {
    pub fn new(downloader: Arc<dyn VideoDownloader>, download_dir: PathBuf) -> Self {
        Self {
            menu: MenuState::new(2),
            downloader,
            download_dir,
            alert: None,
            alert_generation: 0,
            downloading: false,
            request: 0,
        }
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_ref().map(|a| a.text.as_str())
    }

    /// Show an alert that stays until replaced.
    fn show(&mut self, text: &str, is_error: bool) {
        self.alert_generation += 1;
        self.alert = Some(Alert {
            text: text.to_string(),
            is_error,
        });
    }

    /// Show an alert and schedule its removal.
    fn flash(&mut self, text: &str, is_error: bool) -> Command {
        self.show(text, is_error);
        Command::After(ALERT_DURATION, Message::ClearAlert(self.alert_generation))
    }

    fn start_download(&mut self, nav: &Navigator) -> Outcome {
        if self.downloading {
            return Outcome::stay();
        }
        let Some(PageSummary::Ready { label, value: url }) = nav.summary(YOUTUBE_SET_URL) else {
            return Outcome::stay().with(self.flash(NO_METADATA, true));
        };

        info!("Downloading '{}' into {}", label, self.download_dir.display());
        self.downloading = true;
        self.request += 1;
        self.show(DOWNLOADING, false);

        let request = self.request;
        let downloader = Arc::clone(&self.downloader);
        let destination = self.download_dir.clone();
        Outcome::stay().with(Command::Task(Box::pin(async move {
            let result = downloader
                .download(&url, &destination)
                .await
                .map_err(|e| e.to_string());
            Message::DownloadFinished { request, result }
        })))
    }

    fn finished(&mut self, request: u64, result: &Result<PathBuf, String>) -> Outcome {
        if request != self.request {
            return Outcome::stay();
        }
        self.downloading = false;
        let command = match result {
            Ok(path) => {
                info!("Download finished: {}", path.display());
                self.flash(DOWNLOADED, false)
            }
            Err(e) => {
                warn!("Download failed: {}", e);
                self.flash(e, true)
            }
        };
        Outcome::stay().with(command)
    }
}

impl Page for YouTubeHomePage {
    fn title(&self) -> &str {
        "YouTube"
    }

    fn handle_event(&mut self, event: &PageEvent, nav: &Navigator) -> Outcome {
        match event {
            PageEvent::Input(TuiEvent::Escape | TuiEvent::Backspace) => Outcome::back(),
            PageEvent::Input(input) => match self.menu.handle_event(input) {
                Some(MenuEvent::Select(SET_URL_ENTRY)) => Outcome::switch_to(YOUTUBE_SET_URL),
                Some(MenuEvent::Select(DOWNLOAD_ENTRY)) => self.start_download(nav),
                _ => Outcome::stay(),
            },
            PageEvent::Message(Message::ClearAlert(generation)) => {
                if *generation == self.alert_generation {
                    self.alert = None;
                }
                Outcome::stay()
            }
            PageEvent::Message(Message::DownloadFinished { request, result }) => {
                self.finished(*request, result)
            }
            PageEvent::Message(_) => Outcome::stay(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, nav: &Navigator) {
        let area = centered_panel_area(area, 5);
        let block = panel("YouTube").title_bottom(hints("↑/↓ Move  Enter Select  Esc Back"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [menu_area, video_area, alert_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(inner);

        let summary = nav.summary(YOUTUBE_SET_URL);
        let set_url_label = match summary {
            Some(PageSummary::Ready { .. }) => "Set Url (Reset)",
            _ => "Set Url",
        };
        Menu::new(
            &self.menu,
            vec![Line::from(set_url_label), Line::from("Download")],
        )
        .render(frame, menu_area);

        let video = match summary {
            Some(PageSummary::Ready { label, .. }) => Some(Line::from(vec![
                Span::styled("Video: ", Style::default().fg(Color::DarkGray)),
                Span::raw(label),
            ])),
            Some(PageSummary::Busy) => Some(Line::from(Span::styled(
                "Fetching metadata...",
                Style::default().fg(Color::Yellow),
            ))),
            _ => None,
        };
        if let Some(video) = video {
            frame.render_widget(Paragraph::new(video), video_area);
        }

        if let Some(alert) = &self.alert {
            let color = if alert.is_error { Color::Red } else { Color::Green };
            frame.render_widget(
                Paragraph::new(Span::styled(alert.text.as_str(), Style::default().fg(color))),
                alert_area,
            );
        }
    }

    fn summary(&self) -> Option<PageSummary> {
        Some(if self.downloading {
            PageSummary::Busy
        } else {
            PageSummary::Idle
        })
    }
}
