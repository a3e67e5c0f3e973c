//! # TitleBar Component
//!
//! Top status bar: application name, breadcrumb trail of the navigation
//! stack, and a wall-clock on the right.
//!
//! ```text
//! Sterben | Home › YouTube › Set Url                          14:03:27
//! ```
//!
//! Stateless: all data arrives as props, so the event loop decides when the
//! clock ticks (it redraws whenever the displayed second changes).

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;

pub const APP_NAME: &str = "Sterben";
const SEPARATOR: &str = " › ";

pub struct TitleBar {
    /// Titles of the stacked pages, bottom first.
    pub breadcrumbs: Vec<String>,
    /// Preformatted clock text, e.g. `14:03:27`.
    pub clock: String,
}

impl TitleBar {
    pub fn new(breadcrumbs: Vec<String>, clock: String) -> Self {
        Self { breadcrumbs, clock }
    }

    /// Format a timestamp the way the bar displays it.
    pub fn clock_text(now: chrono::DateTime<chrono::Local>) -> String {
        now.format("%H:%M:%S").to_string()
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let clock_width = self.clock.width() as u16;
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(clock_width)]).areas(area);

        let mut spans = vec![Span::styled(
            APP_NAME,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )];
        if !self.breadcrumbs.is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.breadcrumbs.join(SEPARATOR),
                Style::default().fg(Color::Gray),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), left);
        frame.render_widget(
            Paragraph::new(Span::styled(
                self.clock.as_str(),
                Style::default().fg(Color::DarkGray),
            )),
            right,
        );
    }
}
