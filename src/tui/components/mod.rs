//! # TUI Components
//!
//! Building blocks shared by the pages.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: app name, breadcrumbs and clock
//!
//! ### Stateful Components (Event-Driven)
//!
//! State lives in the page; a transient view borrows it for drawing:
//! - `MenuState` / `Menu`: option list with a selection marker
//! - `TextInput` / `TextInputView`: single-line field with a blinking cursor
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── menu.rs
//! └── text_input.rs
//! ```

use ratatui::layout::{Constraint, Flex, Layout, Rect};

mod title_bar;
pub use title_bar::TitleBar;

pub mod menu;
pub use menu::{Menu, MenuEvent, MenuState};
pub mod text_input;
pub use text_input::{InputEvent, TextInput, TextInputView};

/// A `width` x `height` rect centered in `outer`, clamped to its size.
pub fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(outer.height))])
        .flex(Flex::Center)
        .areas(outer);
    let [center] = Layout::horizontal([Constraint::Length(width.min(outer.width))])
        .flex(Flex::Center)
        .areas(row);
    center
}
