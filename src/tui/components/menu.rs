//! # Menu Component
//!
//! Vertical list of options with one highlighted entry.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `MenuState` lives in the page and survives revisits
//! - `Menu` is created each frame with borrowed state and the labels to show
//!
//! Labels are supplied per frame so a page can decorate them from live data
//! (e.g. `Set Url (Reset)` once a URL is stored).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const MARKER: &str = "> ";

/// Events emitted by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    Select(usize),
}

/// Persistent menu state.
#[derive(Debug, Clone)]
pub struct MenuState {
    len: usize,
    selected: usize,
}

impl MenuState {
    pub fn new(len: usize) -> Self {
        Self { len, selected: 0 }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}

impl EventHandler for MenuState {
    type Event = MenuEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<MenuEvent> {
        if self.len == 0 {
            return None;
        }
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(self.len - 1);
                None
            }
            TuiEvent::Submit => Some(MenuEvent::Select(self.selected)),
            _ => None,
        }
    }
}

/// Transient render wrapper for a [`MenuState`].
pub struct Menu<'a> {
    state: &'a MenuState,
    labels: Vec<Line<'a>>,
}

impl<'a> Menu<'a> {
    pub fn new(state: &'a MenuState, labels: Vec<Line<'a>>) -> Self {
        Self { state, labels }
    }
}

impl Component for Menu<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let selected_style = Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD);
        let idle_style = Style::default().fg(Color::Gray);

        let items: Vec<ListItem> = std::mem::take(&mut self.labels)
            .into_iter()
            .enumerate()
            .map(|(i, label)| {
                let (marker, style) = if i == self.state.selected() {
                    (MARKER, selected_style)
                } else {
                    ("  ", idle_style)
                };
                let mut spans = vec![Span::styled(marker, style)];
                spans.extend(
                    label
                        .spans
                        .into_iter()
                        .map(|span| Span::styled(span.content, style.patch(span.style))),
                );
                ListItem::new(Line::from(spans))
            })
            .collect();

        let mut list_state = ListState::default().with_selected(Some(self.state.selected()));
        frame.render_stateful_widget(List::new(items), area, &mut list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(state: &MenuState, labels: &[&'static str]) -> String {
        let mut terminal = Terminal::new(TestBackend::new(20, labels.len() as u16)).unwrap();
        terminal
            .draw(|f| {
                let lines = labels.iter().map(|l| Line::from(*l)).collect();
                Menu::new(state, lines).render(f, f.area());
            })
            .unwrap();
        crate::test_support::buffer_text(&terminal)
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut menu = MenuState::new(2);
        menu.handle_event(&TuiEvent::CursorUp);
        assert_eq!(menu.selected(), 0);
        menu.handle_event(&TuiEvent::CursorDown);
        menu.handle_event(&TuiEvent::CursorDown);
        assert_eq!(menu.selected(), 1);
    }

    #[test]
    fn test_submit_selects_current() {
        let mut menu = MenuState::new(2);
        menu.handle_event(&TuiEvent::CursorDown);
        assert_eq!(
            menu.handle_event(&TuiEvent::Submit),
            Some(MenuEvent::Select(1))
        );
        menu.handle_event(&TuiEvent::CursorUp);
        assert_eq!(
            menu.handle_event(&TuiEvent::Submit),
            Some(MenuEvent::Select(0))
        );
    }

    #[test]
    fn test_empty_menu_ignores_input() {
        let mut menu = MenuState::new(0);
        assert_eq!(menu.handle_event(&TuiEvent::Submit), None);
        assert_eq!(menu.handle_event(&TuiEvent::CursorDown), None);
    }

    #[test]
    fn test_marker_follows_selection() {
        let mut menu = MenuState::new(2);
        let text = render(&menu, &["YouTube", "Image to Icon"]);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("> YouTube"));
        assert!(rows[1].starts_with("  Image to Icon"));

        menu.handle_event(&TuiEvent::CursorDown);
        let text = render(&menu, &["YouTube", "Image to Icon"]);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[0].starts_with("  YouTube"));
        assert!(rows[1].starts_with("> Image to Icon"));
    }
}
