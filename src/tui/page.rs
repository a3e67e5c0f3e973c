//! # Page Contract
//!
//! A page is one full-screen unit of interaction (home menu, a form, a picker).
//! Pages never touch the navigation stack themselves: `handle_event` returns an
//! [`Outcome`] and the event loop asks the [`Navigator`] to carry it out.
//!
//! ```text
//! TuiEvent / Message ──▶ Page::handle_event ──▶ Outcome { transition, commands }
//!                                                   │            │
//!                                                   ▼            ▼
//!                                              Navigator     tokio tasks
//!                                                               │
//!                              Envelope { target, message } ◀───┘
//! ```
//!
//! Slow work is described as a [`Command`]. Its result is a [`Message`] that
//! comes back through the same channel as every other event, addressed to the
//! page that issued it, so page state is only ever written on the event thread.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use futures::future::BoxFuture;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::features::image_convert::IconSet;
use crate::features::youtube::VideoMetadata;
use crate::tui::event::TuiEvent;
use crate::tui::navigator::Navigator;

/// Registry key for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(&'static str);

impl PageId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Results of deferred or background work, routed back to the issuing page.
#[derive(Debug)]
pub enum Message {
    /// Cursor blink timer. Carries the blink generation that armed it.
    Blink(u64),
    /// Alert expiry. Carries the alert generation it belongs to.
    ClearAlert(u64),
    MetadataFetched {
        request: u64,
        result: Result<VideoMetadata, String>,
    },
    DownloadFinished {
        request: u64,
        result: Result<PathBuf, String>,
    },
    IconsConverted {
        request: u64,
        result: Result<IconSet, String>,
    },
}

/// Everything a page can be asked to react to.
#[derive(Debug)]
pub enum PageEvent {
    Input(TuiEvent),
    Message(Message),
}

/// Deferred effect requested by a page.
pub enum Command {
    /// Deliver the message after a delay.
    After(Duration, Message),
    /// Run the future off the event thread and deliver what it resolves to.
    Task(BoxFuture<'static, Message>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::After(delay, message) => {
                f.debug_tuple("After").field(delay).field(message).finish()
            }
            Command::Task(_) => f.write_str("Task(..)"),
        }
    }
}

/// Navigation request attached to an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    SwitchTo(PageId),
    Back,
    Quit,
}

/// What a page wants done after handling an event.
#[derive(Debug)]
pub struct Outcome {
    pub transition: Transition,
    pub commands: Vec<Command>,
}

impl Outcome {
    pub fn stay() -> Self {
        Self::transition(Transition::Stay)
    }

    pub fn switch_to(id: PageId) -> Self {
        Self::transition(Transition::SwitchTo(id))
    }

    pub fn back() -> Self {
        Self::transition(Transition::Back)
    }

    pub fn quit() -> Self {
        Self::transition(Transition::Quit)
    }

    fn transition(transition: Transition) -> Self {
        Self {
            transition,
            commands: Vec::new(),
        }
    }

    /// Attach a deferred effect.
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

/// Read-only status one page exposes to its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSummary {
    Idle,
    Busy,
    Failed(String),
    /// `label` is for display, `value` is the payload a sibling may act on.
    Ready { label: String, value: String },
}

/// A full-screen page managed by the [`Navigator`].
pub trait Page: Send {
    fn title(&self) -> &str;

    /// Called every time the page is pushed onto the stack. Must tolerate revisits.
    fn init(&mut self) -> Vec<Command> {
        Vec::new()
    }

    /// The only place page state changes. Must not block.
    fn handle_event(&mut self, event: &PageEvent, nav: &Navigator) -> Outcome;

    /// Draw the current state. Must not block.
    fn render(&self, frame: &mut Frame, area: Rect, nav: &Navigator);

    /// Status visible to other pages through [`Navigator::summary`].
    fn summary(&self) -> Option<PageSummary> {
        None
    }
}
