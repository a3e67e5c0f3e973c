//! # TUI Adapter
//!
//! The ratatui-specific layer. Owns the terminal, polls crossterm for input,
//! and drives the [`Navigator`].
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//!  crossterm ──TuiEvent──▶ Dispatcher::dispatch ──▶ current page
//!                                                     │
//!                                Outcome { transition, commands }
//!                                  │                      │
//!                          Navigator (stack)      tokio::spawn (sleep / task)
//!                                                         │
//!  rx.try_recv() ◀──────────── Envelope { target, message }
//!       │
//!       └──▶ Dispatcher::deliver ──▶ target page (even if not on top)
//! ```
//!
//! Every page mutation happens on the loop thread. Background work only ever
//! produces an [`Envelope`]; it never touches a page or the stack.
//!
//! ## Redraw Strategy
//!
//! Draw after any input or delivered message, and when the title bar clock
//! changes second. Otherwise the loop sleeps in `poll` for up to 250ms.

pub mod component;
pub mod components;
pub mod event;
pub mod navigator;
pub mod page;
pub mod pages;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, error, info, warn};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::core::config::ResolvedConfig;
use crate::features::image_convert::IconConverter;
use crate::features::youtube::VideoDownloader;
use crate::tui::components::TitleBar;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::navigator::{Back, NavigationError, Navigator, lock};
use crate::tui::page::{Command, Message, PageEvent, PageId, Transition};

const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// A background result addressed to the page that asked for it.
#[derive(Debug)]
pub struct Envelope {
    pub target: PageId,
    pub message: Message,
}

/// Whether the event loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Routes events to pages and carries out their outcomes.
///
/// Holds no terminal, so it can be driven directly from tests.
pub struct Dispatcher {
    navigator: Arc<Navigator>,
    tx: UnboundedSender<Envelope>,
}

impl Dispatcher {
    pub fn new(navigator: Arc<Navigator>, tx: UnboundedSender<Envelope>) -> Self {
        Self { navigator, tx }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Push the root page and schedule its init commands.
    pub fn start(&self, root: PageId) -> Result<(), NavigationError> {
        let commands = self.navigator.switch_to(root)?;
        let active = self.navigator.current_id()?;
        self.schedule(active, commands);
        Ok(())
    }

    /// Handle one input event.
    pub fn dispatch(&self, event: TuiEvent) -> Flow {
        match event {
            TuiEvent::ForceQuit => {
                info!("Quit requested (Ctrl+C)");
                Flow::Quit
            }
            // Resize only needs a redraw.
            TuiEvent::Resize => Flow::Continue,
            event => match self.navigator.current_id() {
                Ok(id) => self.deliver_to(id, PageEvent::Input(event)),
                Err(e) => {
                    error!("Dropping input {:?}: {}", event, e);
                    Flow::Continue
                }
            },
        }
    }

    /// Handle one background result.
    pub fn deliver(&self, envelope: Envelope) -> Flow {
        debug!("Delivering {:?} to {}", envelope.message, envelope.target);
        self.deliver_to(envelope.target, PageEvent::Message(envelope.message))
    }

    fn deliver_to(&self, target: PageId, event: PageEvent) -> Flow {
        let Some(page) = self.navigator.lookup(target) else {
            warn!("Dropping event for unregistered page {}", target);
            return Flow::Continue;
        };
        let outcome = lock(&page).handle_event(&event, &self.navigator);
        self.schedule(target, outcome.commands);
        self.apply(target, outcome.transition)
    }

    /// Carry out a page's navigation request.
    fn apply(&self, source: PageId, transition: Transition) -> Flow {
        if transition == Transition::Stay {
            return Flow::Continue;
        }
        // Only the page on screen may move the stack. A result landing on a
        // page the user already left updates that page and nothing else.
        match self.navigator.current_id() {
            Ok(current) if current == source => {}
            Ok(current) => {
                info!(
                    "Ignoring {:?} from {} (active page is {})",
                    transition, source, current
                );
                return Flow::Continue;
            }
            Err(e) => {
                error!("Cannot apply {:?} from {}: {}", transition, source, e);
                return Flow::Quit;
            }
        }

        match transition {
            Transition::Stay => Flow::Continue,
            Transition::Quit => {
                info!("Quit requested by {}", source);
                Flow::Quit
            }
            Transition::SwitchTo(id) => {
                let result = self
                    .navigator
                    .switch_to(id)
                    .and_then(|commands| Ok((self.navigator.current_id()?, commands)));
                match result {
                    Ok((active, commands)) => {
                        self.schedule(active, commands);
                        Flow::Continue
                    }
                    Err(e) => {
                        error!("Navigation to {} failed: {}", id, e);
                        Flow::Quit
                    }
                }
            }
            Transition::Back => match self.navigator.switch_to_previous() {
                Ok(Back::Exit) => Flow::Quit,
                Ok(Back::Resumed(_)) => Flow::Continue,
                Err(e) => {
                    error!("Back navigation failed: {}", e);
                    Flow::Quit
                }
            },
        }
    }

    /// Run deferred commands on tokio; results come back as envelopes for `target`.
    pub fn schedule(&self, target: PageId, commands: Vec<Command>) {
        for command in commands {
            let tx = self.tx.clone();
            match command {
                Command::After(delay, message) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        send(&tx, Envelope { target, message });
                    });
                }
                Command::Task(task) => {
                    debug!("Spawning background task for {}", target);
                    tokio::spawn(async move {
                        let message = task.await;
                        send(&tx, Envelope { target, message });
                    });
                }
            }
        }
    }
}

fn send(tx: &UnboundedSender<Envelope>, envelope: Envelope) {
    if let Err(e) = tx.send(envelope) {
        // Normal during shutdown: the loop is gone.
        debug!("Dropping {:?} for {}: receiver closed", e.0.message, e.0.target);
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // The text input draws its own blinking block, so the hardware cursor stays hidden.
        execute!(stdout(), EnableBracketedPaste, Hide)?;
        info!("Terminal modes enabled (bracketed paste, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Show);
    }
}

pub fn run(
    config: ResolvedConfig,
    downloader: Arc<dyn VideoDownloader>,
    converter: Arc<dyn IconConverter>,
) -> io::Result<()> {
    let navigator = Arc::new(Navigator::new());
    pages::register_all(
        &navigator,
        config.download_dir,
        config.icon_sizes,
        downloader,
        converter,
    );

    // Channel for results from background tasks
    let (tx, mut rx) = unbounded_channel();
    let dispatcher = Dispatcher::new(navigator, tx);
    dispatcher.start(pages::HOME).map_err(io::Error::other)?;

    let mut terminal = ratatui::try_init()?;
    let terminal_mode_guard = match TerminalModeGuard::new() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!("Could not set terminal modes: {}", e);
            None
        }
    };

    let result = event_loop(&mut terminal, &dispatcher, &mut rx);
    if let Err(e) = &result {
        error!("Event loop failed: {}", e);
    }

    drop(terminal_mode_guard);
    ratatui::restore();
    info!("Terminal restored");
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    dispatcher: &Dispatcher,
    rx: &mut UnboundedReceiver<Envelope>,
) -> io::Result<()> {
    let mut needs_redraw = true; // Force first frame
    let mut clock = String::new();

    loop {
        let now = TitleBar::clock_text(chrono::Local::now());
        if now != clock {
            clock = now;
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, dispatcher.navigator(), &clock))?;
            needs_redraw = false;
        }

        // Process first event + drain ALL pending events before next draw
        let mut next = poll_event_timeout(POLL_TIMEOUT)?;
        while let Some(event) = next {
            needs_redraw = true;
            if dispatcher.dispatch(event) == Flow::Quit {
                return Ok(());
            }
            next = poll_event_immediate()?;
        }

        // Handle background results
        while let Ok(envelope) = rx.try_recv() {
            needs_redraw = true;
            if dispatcher.deliver(envelope) == Flow::Quit {
                return Ok(());
            }
        }
    }
}
