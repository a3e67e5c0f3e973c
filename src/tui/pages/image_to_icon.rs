//! # Image to Icon Page
//!
//! Text field for an image path. Enter converts the image into one `.ico`
//! per configured size on a blocking worker; the result comes back as
//! `Message::IconsConverted` and is kept for the home page to show.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{BLINK_INTERVAL, IMAGE_TO_ICON, centered_panel_area, hints, panel};
use crate::features::image_convert::{IconConverter, IconSet};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{InputEvent, TextInput, TextInputView};
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;
use crate::tui::page::{Command, Message, Outcome, Page, PageEvent, PageSummary};

pub const EMPTY_PATH_ERROR: &str = "Please enter a valid Path";

pub struct ImageToIconPage {
    input: TextInput,
    converter: Arc<dyn IconConverter>,
    sizes: Vec<u32>,
    error: Option<String>,
    loading: bool,
    request: u64,
    /// Survives revisits so the home page can keep showing it.
    last: Option<IconSet>,
}

/// `Wrote N icons to DIR`
pub fn describe(set: &IconSet) -> String {
    format!("Wrote {} icons to {}", set.files.len(), set.dir.display())
}

impl ImageToIconPage {
    pub fn new(converter: Arc<dyn IconConverter>, sizes: Vec<u32>) -> Self {
        Self {
            input: TextInput::new("Enter Image Path"),
            converter,
            sizes,
            error: None,
            loading: false,
            request: 0,
            last: None,
        }
    }

    pub fn last(&self) -> Option<&IconSet> {
        self.last.as_ref()
    }

    fn submit(&mut self, path: String) -> Outcome {
        if path.is_empty() {
            self.error = Some(EMPTY_PATH_ERROR.to_string());
            return Outcome::stay();
        }

        self.request += 1;
        self.loading = true;
        self.error = None;
        info!("Converting {} to {} icon sizes", path, self.sizes.len());

        let request = self.request;
        let converter = Arc::clone(&self.converter);
        let sizes = self.sizes.clone();
        let source = PathBuf::from(path);
        Outcome::stay().with(Command::Task(Box::pin(async move {
            let result = tokio::task::spawn_blocking(move || converter.convert(&source, &sizes))
                .await
                .map_err(|e| format!("conversion worker failed: {e}"))
                .and_then(|converted| converted.map_err(|e| e.to_string()));
            Message::IconsConverted { request, result }
        })))
    }

    fn converted(&mut self, request: u64, result: &Result<IconSet, String>) -> Outcome {
        if request != self.request {
            debug!("Ignoring stale conversion result {} (current {})", request, self.request);
            return Outcome::stay();
        }
        self.loading = false;
        match result {
            Ok(set) => {
                info!("{}", describe(set));
                self.last = Some(set.clone());
                Outcome::back()
            }
            Err(e) => {
                warn!("Conversion failed: {}", e);
                self.error = Some(e.clone());
                Outcome::stay()
            }
        }
    }
}

impl Page for ImageToIconPage {
    fn title(&self) -> &str {
        "Image to Icon"
    }

    fn init(&mut self) -> Vec<Command> {
        self.input.reset();
        self.error = None;
        self.loading = false;
        self.request += 1;
        let generation = self.input.start_blink();
        vec![Command::After(BLINK_INTERVAL, Message::Blink(generation))]
    }

    fn handle_event(&mut self, event: &PageEvent, nav: &Navigator) -> Outcome {
        match event {
            PageEvent::Input(TuiEvent::Escape) => Outcome::back(),
            PageEvent::Input(_) if self.loading => Outcome::stay(),
            PageEvent::Input(input) => match self.input.handle_event(input) {
                Some(InputEvent::Submit(path)) => self.submit(path),
                Some(InputEvent::ContentChanged) => {
                    self.error = None;
                    Outcome::stay()
                }
                None => Outcome::stay(),
            },
            PageEvent::Message(Message::Blink(generation)) => {
                let on_screen = nav.current_id() == Ok(IMAGE_TO_ICON);
                if on_screen && self.input.blink(*generation) {
                    Outcome::stay().with(Command::After(BLINK_INTERVAL, Message::Blink(*generation)))
                } else {
                    Outcome::stay()
                }
            }
            PageEvent::Message(Message::IconsConverted { request, result }) => {
                self.converted(*request, result)
            }
            PageEvent::Message(_) => Outcome::stay(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _nav: &Navigator) {
        let area = centered_panel_area(area, 4);
        let block = panel("Image to Icon").title_bottom(hints("Enter Convert  Esc Back"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [input_area, _, status_area, sizes_area] = Layout::vertical([
            Constraint::Length(1),
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

        let sizes = self
            .sizes
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Sizes: {sizes}"),
                Style::default().fg(Color::DarkGray),
            )),
            sizes_area,
        );
    }

    fn summary(&self) -> Option<PageSummary> {
        if self.loading {
            return Some(PageSummary::Busy);
        }
        if let Some(error) = &self.error {
            return Some(PageSummary::Failed(error.clone()));
        }
        Some(match &self.last {
            Some(set) => PageSummary::Ready {
                label: describe(set),
                value: set.dir.display().to_string(),
            },
            None => PageSummary::Idle,
        })
    }
}
