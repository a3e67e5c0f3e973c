//! # YouTube Set Url Page
//!
//! Text field for a video URL. Enter fetches the video's metadata in the
//! background; on success the page stores it and returns to the YouTube
//! menu, which reads it back through [`Page::summary`].
//!
//! ```text
//! init ─▶ idle ──Enter(empty)──▶ "Please enter a valid URL"
//!          │
//!          └──Enter(url)──▶ loading ──MetadataFetched(Ok)──▶ stored, Back
//!                                   └─MetadataFetched(Err)─▶ inline error
//! ```
//!
//! Every visit starts from a clean form. A fetch issued before the reset
//! carries an old request number and is dropped when it lands.

use std::sync::Arc;

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{BLINK_INTERVAL, YOUTUBE_SET_URL, centered_panel_area, hints, panel};
use crate::features::youtube::{VideoDownloader, VideoMetadata};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{InputEvent, TextInput, TextInputView};
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;
use crate::tui::page::{Command, Message, Outcome, Page, PageEvent, PageSummary};

pub const EMPTY_URL_ERROR: &str = "Please enter a valid URL";

pub struct YouTubeSetUrlPage {
    input: TextInput,
    downloader: Arc<dyn VideoDownloader>,
    /// URL of the fetch in flight, then of the stored metadata.
    url: Option<String>,
    metadata: Option<VideoMetadata>,
    error: Option<String>,
    loading: bool,
    request: u64,
}

impl YouTubeSetUrlPage {
    pub fn new(downloader: Arc<dyn VideoDownloader>) -> Self {
        Self {
            input: TextInput::new("Set Url"),
            downloader,
            url: None,
            metadata: None,
            error: None,
            loading: false,
            request: 0,
        }
    }

    pub fn metadata(&self) -> Option<&VideoMetadata> {
        self.metadata.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn reset(&mut self) {
        self.input.reset();
        self.url = None;
        self.metadata = None;
        self.error = None;
        self.loading = false;
        // Orphans any fetch still running.
        self.request += 1;
    }

    fn submit(&mut self, url: String) -> Outcome {
        if url.is_empty() {
            self.error = Some(EMPTY_URL_ERROR.to_string());
            return Outcome::stay();
        }

        self.request += 1;
        self.loading = true;
        self.error = None;
        self.metadata = None;
        self.url = Some(url.clone());
        info!("Fetching metadata for {}", url);

        let request = self.request;
        let downloader = Arc::clone(&self.downloader);
        Outcome::stay().with(Command::Task(Box::pin(async move {
            let result = downloader
                .fetch_metadata(&url)
                .await
                .map_err(|e| e.to_string());
            Message::MetadataFetched { request, result }
        })))
    }

    fn fetched(&mut self, request: u64, result: &Result<VideoMetadata, String>) -> Outcome {
        if request != self.request {
            debug!("Ignoring stale metadata result {} (current {})", request, self.request);
            return Outcome::stay();
        }
        self.loading = false;
        match result {
            Ok(metadata) => {
                info!("Fetched metadata for '{}'", metadata.title);
                self.metadata = Some(metadata.clone());
                Outcome::back()
            }
            Err(e) => {
                warn!("Metadata fetch failed: {}", e);
                self.url = None;
                self.error = Some(e.clone());
                Outcome::stay()
            }
        }
    }
}

impl Page for YouTubeSetUrlPage {
    fn title(&self) -> &str {
        "Set Url"
    }

    fn init(&mut self) -> Vec<Command> {
        self.reset();
        let generation = self.input.start_blink();
        vec![Command::After(BLINK_INTERVAL, Message::Blink(generation))]
    }

    fn handle_event(&mut self, event: &PageEvent, nav: &Navigator) -> Outcome {
        match event {
            PageEvent::Input(TuiEvent::Escape) => Outcome::back(),
            PageEvent::Input(_) if self.loading => Outcome::stay(),
            PageEvent::Input(input) => match self.input.handle_event(input) {
                Some(InputEvent::Submit(url)) => self.submit(url),
                Some(InputEvent::ContentChanged) => {
                    self.error = None;
                    Outcome::stay()
                }
                None => Outcome::stay(),
            },
            PageEvent::Message(Message::Blink(generation)) => {
                // The chain ends once the page is off screen; init starts a new one.
                let on_screen = nav.current_id() == Ok(YOUTUBE_SET_URL);
                if on_screen && self.input.blink(*generation) {
                    Outcome::stay().with(Command::After(BLINK_INTERVAL, Message::Blink(*generation)))
                } else {
                    Outcome::stay()
                }
            }
            PageEvent::Message(Message::MetadataFetched { request, result }) => {
                self.fetched(*request, result)
            }
            PageEvent::Message(_) => Outcome::stay(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _nav: &Navigator) {
        let area = centered_panel_area(area, 3);
        let block = panel("Set Url").title_bottom(hints("Enter Fetch  Esc Back"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [input_area, _, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        TextInputView::new(&self.input).render(frame, input_area);

        let status = if self.loading {
            Some(Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            )))
        } else {
            self.error
                .as_deref()
                .map(|e| Line::from(Span::styled(e, Style::default().fg(Color::Red))))
        };
        if let Some(status) = status {
            frame.render_widget(Paragraph::new(status), status_area);
        }
    }

    fn summary(&self) -> Option<PageSummary> {
        if self.loading {
            return Some(PageSummary::Busy);
        }
        if let Some(error) = &self.error {
            return Some(PageSummary::Failed(error.clone()));
        }
        match (&self.metadata, &self.url) {
            (Some(metadata), Some(url)) => Some(PageSummary::Ready {
                label: format!("{} [{}]", metadata.title, metadata.duration_label()),
                value: url.clone(),
            }),
            _ => Some(PageSummary::Idle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeDownloader, render_page, sample_metadata};
    use crate::tui::page::Transition;
    use crate::tui::pages::YOUTUBE_HOME;

    const URL: &str = "https://www.youtube.com/watch?v=Tkb2yVr8kfY";

    fn setup(downloader: FakeDownloader) -> (Navigator, YouTubeSetUrlPage) {
        let nav = Navigator::new();
        nav.register(YOUTUBE_HOME, crate::test_support::CountingPage::new("YouTube"));
        nav.switch_to(YOUTUBE_HOME).unwrap();
        let mut page = YouTubeSetUrlPage::new(Arc::new(downloader));
        page.init();
        (nav, page)
    }

    fn type_text(page: &mut YouTubeSetUrlPage, nav: &Navigator, text: &str) {
        for c in text.chars() {
            page.handle_event(&PageEvent::Input(TuiEvent::InputChar(c)), nav);
        }
    }

    /// Submit, run the resulting task to completion and feed the message back.
    async fn submit_and_settle(page: &mut YouTubeSetUrlPage, nav: &Navigator) -> Outcome {
        let mut outcome = page.handle_event(&PageEvent::Input(TuiEvent::Submit), nav);
        assert!(page.is_loading());
        let Some(Command::Task(task)) = outcome.commands.pop() else {
            panic!("expected a fetch task");
        };
        let message = task.await;
        page.handle_event(&PageEvent::Message(message), nav)
    }

    #[test]
    fn test_init_arms_blink_and_resets() {
        let (_nav, mut page) = setup(FakeDownloader::default());
        page.error = Some("old".into());
        page.loading = true;

        let commands = page.init();

        assert!(matches!(
            commands.as_slice(),
            [Command::After(d, Message::Blink(_))] if *d == BLINK_INTERVAL
        ));
        assert!(page.error.is_none());
        assert!(!page.is_loading());
        assert_eq!(page.summary(), Some(PageSummary::Idle));
    }

    #[test]
    fn test_empty_submit_shows_error() {
        let (nav, mut page) = setup(FakeDownloader::default());
        let outcome = page.handle_event(&PageEvent::Input(TuiEvent::Submit), &nav);
        assert_eq!(outcome.transition, Transition::Stay);
        assert!(outcome.commands.is_empty());
        assert_eq!(page.error.as_deref(), Some(EMPTY_URL_ERROR));
        assert!(render_page(&page, &nav, 80, 10).contains(EMPTY_URL_ERROR));
    }

    #[tokio::test]
    async fn test_successful_fetch_stores_metadata_and_goes_back() {
        let (nav, mut page) = setup(FakeDownloader::with_metadata(sample_metadata()));
        type_text(&mut page, &nav, URL);

        let outcome = submit_and_settle(&mut page, &nav).await;

        assert_eq!(outcome.transition, Transition::Back);
        assert!(!page.is_loading());
        assert_eq!(page.metadata(), Some(&sample_metadata()));
        assert_eq!(
            page.summary(),
            Some(PageSummary::Ready {
                label: "Sample Video [3:32]".into(),
                value: URL.into()
            })
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_inline_error() {
        let (nav, mut page) = setup(FakeDownloader::failing("ERROR: Unsupported URL"));
        type_text(&mut page, &nav, "not a url");

        let outcome = submit_and_settle(&mut page, &nav).await;

        assert_eq!(outcome.transition, Transition::Stay);
        assert!(page.metadata().is_none());
        assert_eq!(
            page.summary(),
            Some(PageSummary::Failed(
                "yt-dlp exited with status 1: ERROR: Unsupported URL".into()
            ))
        );
        assert!(render_page(&page, &nav, 80, 10).contains("ERROR: Unsupported URL"));
    }

    #[test]
    fn test_render_while_loading() {
        let (nav, mut page) = setup(FakeDownloader::default());
        type_text(&mut page, &nav, URL);
        page.handle_event(&PageEvent::Input(TuiEvent::Submit), &nav);

        let text = render_page(&page, &nav, 80, 10);
        assert!(text.contains("Loading..."));
        assert_eq!(page.summary(), Some(PageSummary::Busy));
    }

    #[test]
    fn test_typing_is_ignored_while_loading() {
        let (nav, mut page) = setup(FakeDownloader::default());
        type_text(&mut page, &nav, "a");
        page.handle_event(&PageEvent::Input(TuiEvent::Submit), &nav);
        type_text(&mut page, &nav, "b");
        assert_eq!(page.input.value(), "a");
    }

    #[test]
    fn test_stale_result_after_reset_is_ignored() {
        let (nav, mut page) = setup(FakeDownloader::default());
        type_text(&mut page, &nav, URL);
        page.handle_event(&PageEvent::Input(TuiEvent::Submit), &nav);
        let stale = page.request;

        // Revisit: the form is reset while the fetch is still running.
        page.init();
        let outcome = page.handle_event(
            &PageEvent::Message(Message::MetadataFetched {
                request: stale,
                result: Ok(sample_metadata()),
            }),
            &nav,
        );

        assert_eq!(outcome.transition, Transition::Stay);
        assert!(page.metadata().is_none());
        assert_eq!(page.summary(), Some(PageSummary::Idle));
    }

    #[test]
    fn test_blink_rearms_only_while_on_screen() {
        let (nav, mut page) = setup(FakeDownloader::default());
        let generation = page.input.start_blink();

        // Not the current page: the chain stops.
        let outcome = page.handle_event(&PageEvent::Message(Message::Blink(generation)), &nav);
        assert!(outcome.commands.is_empty());

        nav.register(YOUTUBE_SET_URL, crate::test_support::CountingPage::new("Set Url"));
        nav.switch_to(YOUTUBE_SET_URL).unwrap();
        let outcome = page.handle_event(&PageEvent::Message(Message::Blink(generation)), &nav);
        assert_eq!(outcome.commands.len(), 1);
        assert!(!page.input.cursor_visible());
    }
}
