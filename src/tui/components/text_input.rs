//! # TextInput Component
//!
//! Single-line text field with a blinking block cursor.
//!
//! The blink is driven by the owning page: `start_blink()` returns a
//! generation number the page schedules a `Message::Blink` with, and
//! `blink(generation)` toggles the cursor only if that generation is still
//! current. Restarting the blink (page revisit) orphans the old timer chain.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const PROMPT: &str = "> ";

/// High-level events emitted by the TextInput
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Submit(String),
    ContentChanged,
}

pub struct TextInput {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
    placeholder: String,
    cursor_visible: bool,
    blink_generation: u64,
}

impl TextInput {
    pub fn new(placeholder: &str) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            placeholder: placeholder.to_string(),
            cursor_visible: true,
            blink_generation: 0,
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.cursor_visible = true;
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Begin a new blink chain and return its generation.
    pub fn start_blink(&mut self) -> u64 {
        self.blink_generation += 1;
        self.cursor_visible = true;
        self.blink_generation
    }

    /// Toggle the cursor. Returns `false` for a stale generation, which ends that chain.
    pub fn blink(&mut self, generation: u64) -> bool {
        if generation != self.blink_generation {
            return false;
        }
        self.cursor_visible = !self.cursor_visible;
        true
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }
}

impl EventHandler for TextInput {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<InputEvent> {
        // Any keypress shows the cursor so the caret doesn't vanish mid-typing.
        self.cursor_visible = true;
        match event {
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.trim().to_string())),
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let single_line: String = text.chars().filter(|c| !c.is_control()).collect();
                self.insert_str(&single_line);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let start = self.prev_boundary();
                self.buffer.replace_range(start..self.cursor, "");
                self.cursor = start;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let end = self.next_boundary();
                self.buffer.replace_range(self.cursor..end, "");
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::Home => {
                self.cursor = 0;
                None
            }
            TuiEvent::End => {
                self.cursor = self.buffer.len();
                None
            }
            _ => None,
        }
    }
}

/// Transient render wrapper for a [`TextInput`].
pub struct TextInputView<'a> {
    input: &'a TextInput,
    style: Style,
}

impl<'a> TextInputView<'a> {
    pub fn new(input: &'a TextInput) -> Self {
        Self {
            input,
            style: Style::default().fg(Color::Red),
        }
    }

    /// The visible line, scrolled so the cursor stays inside `width` columns.
    pub fn line(&self, width: u16) -> Line<'a> {
        let input = self.input;
        if input.buffer.is_empty() && !input.cursor_visible {
            return Line::from(vec![
                Span::styled(PROMPT, self.style),
                Span::styled(input.placeholder.as_str(), self.style.add_modifier(Modifier::DIM)),
            ]);
        }

        let available = (width as usize).saturating_sub(PROMPT.width() + 1);
        let mut before = &input.buffer[..input.cursor];
        while before.width() > available {
            let mut chars = before.chars();
            chars.next();
            before = chars.as_str();
        }

        let mut rest = input.buffer[input.cursor..].chars();
        let under_cursor = rest.next().map(String::from).unwrap_or_else(|| " ".to_string());
        let after = rest.as_str();

        let cursor_style = if input.cursor_visible {
            self.style.add_modifier(Modifier::REVERSED)
        } else {
            self.style
        };

        let mut spans = vec![Span::styled(PROMPT, self.style)];
        if input.buffer.is_empty() && input.cursor_visible {
            spans.push(Span::styled(" ", cursor_style));
            spans.push(Span::styled(
                input.placeholder.as_str(),
                self.style.add_modifier(Modifier::DIM),
            ));
        } else {
            spans.push(Span::styled(before, self.style));
            spans.push(Span::styled(under_cursor, cursor_style));
            spans.push(Span::styled(after, self.style));
        }
        Line::from(spans)
    }
}

impl Component for TextInputView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.line(area.width)), area);
    }
}
