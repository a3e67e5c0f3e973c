//! Root page: pick a tool.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use super::{IMAGE_TO_ICON, YOUTUBE_HOME, centered_panel_area, hints, panel};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{Menu, MenuEvent, MenuState};
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;
use crate::tui::page::{Outcome, Page, PageEvent, PageId, PageSummary};

const ENTRIES: [(&str, PageId); 2] = [("YouTube", YOUTUBE_HOME), ("Image to Icon", IMAGE_TO_ICON)];

pub struct HomePage {
    menu: MenuState,
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            menu: MenuState::new(ENTRIES.len()),
        }
    }
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

/// Suffix for the Image to Icon entry, from that page's last result.
fn conversion_note(summary: Option<PageSummary>) -> Option<Span<'static>> {
    match summary? {
        PageSummary::Idle => None,
        PageSummary::Busy => Some(Span::styled(
            "  (converting...)",
            Style::default().fg(Color::Yellow),
        )),
        PageSummary::Failed(_) => Some(Span::styled(
            "  (last conversion failed)",
            Style::default().fg(Color::DarkGray),
        )),
        PageSummary::Ready { label, .. } => Some(Span::styled(
            format!("  ({label})"),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

impl Page for HomePage {
    fn title(&self) -> &str {
        "Home"
    }

    fn handle_event(&mut self, event: &PageEvent, _nav: &Navigator) -> Outcome {
        let PageEvent::Input(input) = event else {
            return Outcome::stay();
        };
        match input {
            TuiEvent::Escape | TuiEvent::Backspace => Outcome::back(),
            _ => match self.menu.handle_event(input) {
                Some(MenuEvent::Select(index)) => match ENTRIES.get(index) {
                    Some((_, id)) => Outcome::switch_to(*id),
                    None => Outcome::stay(),
                },
                None => Outcome::stay(),
            },
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, nav: &Navigator) {
        let area = centered_panel_area(area, ENTRIES.len() as u16 + 2);
        let block = panel("Sterben").title_bottom(hints("↑/↓ Move  Enter Select  Esc Quit"));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let note = conversion_note(nav.summary(IMAGE_TO_ICON));
        let labels = ENTRIES
            .iter()
            .map(|(label, id)| {
                let mut line = Line::from(*label);
                if *id == IMAGE_TO_ICON {
                    if let Some(note) = note.clone() {
                        line.push_span(note);
                    }
                }
                line
            })
            .collect();

        Menu::new(&self.menu, labels).render(frame, inner);
    }
}
