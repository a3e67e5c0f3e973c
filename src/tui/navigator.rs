//! # Navigator
//!
//! Owns every registered page and the navigation stack.
//!
//! ```text
//! Navigator
//! └── state: Mutex<NavState>          // one guard for both fields
//!     ├── registry: HashMap<PageId, PageHandle>
//!     └── stack: Vec<PageId>          // bottom = home, top = active page
//! ```
//!
//! Pages live in the registry for the whole run. Popping a page off the
//! stack does not drop it, which is how a page keeps its fields (fetched
//! metadata, errors, cursor position) between visits.
//!
//! The guard is held only for registry/stack bookkeeping. Page hooks
//! (`init`, `handle_event`, `render`) run after it is released, so a page
//! may call back into the navigator (e.g. [`Navigator::summary`]) freely.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use log::{debug, error, info, warn};

use crate::tui::page::{Command, Page, PageId, PageSummary};

/// Shared handle to a registered page.
pub type PageHandle = Arc<Mutex<dyn Page>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The stack is empty. Only reachable if the navigator was never started.
    EmptyStack,
    /// The stack refers to a page that is no longer registered.
    UnknownPage(PageId),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::EmptyStack => write!(f, "no pages in navigation stack"),
            NavigationError::UnknownPage(id) => write!(f, "page '{id}' is not registered"),
        }
    }
}

impl std::error::Error for NavigationError {}

/// Result of [`Navigator::switch_to_previous`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    /// Back was requested from the root page; the application should exit.
    Exit,
    /// The top was popped; this page is active again.
    Resumed(PageId),
}

#[derive(Default)]
struct NavState {
    registry: HashMap<PageId, PageHandle>,
    stack: Vec<PageId>,
}

#[derive(Default)]
pub struct Navigator {
    state: Mutex<NavState>,
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page under `id`, replacing any page already there.
    pub fn register<P: Page + 'static>(&self, id: PageId, page: P) {
        let handle: PageHandle = Arc::new(Mutex::new(page));
        let mut state = lock(&self.state);
        if state.registry.insert(id, handle).is_some() {
            info!("Replaced page {}", id);
        } else {
            info!("Added new page {}", id);
        }
    }

    pub fn unregister(&self, id: PageId) -> Option<PageHandle> {
        let mut state = lock(&self.state);
        if state.stack.contains(&id) {
            warn!("Removing page {} while it is on the navigation stack", id);
        }
        let removed = state.registry.remove(&id);
        if removed.is_some() {
            info!("Removed page {}", id);
        }
        removed
    }

    pub fn lookup(&self, id: PageId) -> Option<PageHandle> {
        lock(&self.state).registry.get(&id).cloned()
    }

    /// Push `id` and initialize it, returning the page's deferred effects.
    ///
    /// An unregistered `id` leaves the stack untouched: the failure is logged
    /// and the current page is re-initialized instead.
    pub fn switch_to(&self, id: PageId) -> Result<Vec<Command>, NavigationError> {
        let (handle, active) = {
            let mut state = lock(&self.state);
            match state.registry.get(&id).cloned() {
                Some(handle) => {
                    state.stack.push(id);
                    debug!("Navigation stack depth {}", state.stack.len());
                    (handle, id)
                }
                None => {
                    error!("Failed to switch to page {}: not registered", id);
                    let top = *state.stack.last().ok_or(NavigationError::EmptyStack)?;
                    let handle = state
                        .registry
                        .get(&top)
                        .cloned()
                        .ok_or(NavigationError::UnknownPage(top))?;
                    (handle, top)
                }
            }
        };

        let commands = lock(&handle).init();
        info!("Active page {}", active);
        Ok(commands)
    }

    /// Pop the active page. At the root this reports [`Back::Exit`] and leaves the stack alone.
    pub fn switch_to_previous(&self) -> Result<Back, NavigationError> {
        let mut state = lock(&self.state);
        match state.stack.len() {
            0 => {
                error!("Back requested with an empty navigation stack");
                Err(NavigationError::EmptyStack)
            }
            1 => {
                info!("Back requested from root page {}", state.stack[0]);
                Ok(Back::Exit)
            }
            _ => {
                let popped = state.stack.pop();
                let top = state.stack[state.stack.len() - 1];
                info!("Left page {:?}, back on {}", popped, top);
                Ok(Back::Resumed(top))
            }
        }
    }

    /// The active (top of stack) page.
    pub fn current(&self) -> Result<PageHandle, NavigationError> {
        let state = lock(&self.state);
        let top = *state.stack.last().ok_or(NavigationError::EmptyStack)?;
        state
            .registry
            .get(&top)
            .cloned()
            .ok_or(NavigationError::UnknownPage(top))
    }

    pub fn current_id(&self) -> Result<PageId, NavigationError> {
        lock(&self.state)
            .stack
            .last()
            .copied()
            .ok_or(NavigationError::EmptyStack)
    }

    /// Snapshot of the stack, bottom first.
    pub fn stack(&self) -> Vec<PageId> {
        lock(&self.state).stack.clone()
    }

    pub fn depth(&self) -> usize {
        lock(&self.state).stack.len()
    }

    /// Ask a page for its summary.
    ///
    /// Returns `None` if the page is unknown, has nothing to report, or is
    /// busy handling an event (a page asking about itself).
    pub fn summary(&self, id: PageId) -> Option<PageSummary> {
        let handle = self.lookup(id)?;
        match handle.try_lock() {
            Ok(page) => page.summary(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().summary(),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    /// Titles of the pages on the stack, bottom first. Busy pages show their id.
    pub fn breadcrumbs(&self) -> Vec<String> {
        let handles: Vec<(PageId, Option<PageHandle>)> = {
            let state = lock(&self.state);
            state
                .stack
                .iter()
                .map(|id| (*id, state.registry.get(id).cloned()))
                .collect()
        };
        handles
            .into_iter()
            .map(|(id, handle)| match handle.as_ref().map(|h| h.try_lock()) {
                Some(Ok(page)) => page.title().to_string(),
                _ => id.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingPage, HOME, SET_URL};

    fn navigator_with_home() -> (Navigator, CountingPage, CountingPage) {
        let nav = Navigator::new();
        let home = CountingPage::new("Home");
        let set_url = CountingPage::new("Set Url");
        nav.register(HOME, home.clone());
        nav.register(SET_URL, set_url.clone());
        nav.switch_to(HOME).unwrap();
        (nav, home, set_url)
    }

    #[test]
    fn test_register_and_lookup() {
        let nav = Navigator::new();
        nav.register(HOME, CountingPage::new("Home"));
        let page = nav.lookup(HOME).expect("registered");
        assert_eq!(lock(&page).title(), "Home");
        assert!(nav.lookup(SET_URL).is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let nav = Navigator::new();
        nav.register(HOME, CountingPage::new("Old"));
        nav.register(HOME, CountingPage::new("New"));
        assert_eq!(lock(&nav.lookup(HOME).unwrap()).title(), "New");
    }

    #[test]
    fn test_unregister() {
        let nav = Navigator::new();
        nav.register(HOME, CountingPage::new("Home"));
        assert!(nav.unregister(HOME).is_some());
        assert!(nav.lookup(HOME).is_none());
        assert!(nav.unregister(HOME).is_none());
    }

    #[test]
    fn test_switch_pushes_and_inits_once() {
        let (nav, home, set_url) = navigator_with_home();
        assert_eq!(home.init_count(), 1);

        nav.switch_to(SET_URL).unwrap();

        assert_eq!(nav.stack(), vec![HOME, SET_URL]);
        assert_eq!(set_url.init_count(), 1);
        assert_eq!(home.init_count(), 1);
        let current = nav.current().unwrap();
        assert_eq!(lock(&current).title(), "Set Url");
    }

    #[test]
    fn test_switch_returns_init_commands() {
        let nav = Navigator::new();
        nav.register(HOME, CountingPage::new("Home").with_init_commands(2));
        let commands = nav.switch_to(HOME).unwrap();
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn test_back_restores_previous_state() {
        let (nav, home, _) = navigator_with_home();
        home.set_value(42);

        nav.switch_to(SET_URL).unwrap();
        let back = nav.switch_to_previous().unwrap();

        assert_eq!(back, Back::Resumed(HOME));
        assert_eq!(nav.stack(), vec![HOME]);
        assert_eq!(home.value(), 42);
        // Popping never re-initializes.
        assert_eq!(home.init_count(), 1);
        let current = nav.current().unwrap();
        assert!(Arc::ptr_eq(&current, &nav.lookup(HOME).unwrap()));
    }

    #[test]
    fn test_back_at_root_exits_without_popping() {
        let (nav, _, _) = navigator_with_home();
        assert_eq!(nav.switch_to_previous().unwrap(), Back::Exit);
        assert_eq!(nav.stack(), vec![HOME]);
        assert_eq!(nav.switch_to_previous().unwrap(), Back::Exit);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_switch_to_unknown_page_keeps_stack() {
        let (nav, home, _) = navigator_with_home();
        let missing = PageId::new("doesNotExist");

        let result = nav.switch_to(missing);

        assert!(result.is_ok());
        assert_eq!(nav.stack(), vec![HOME]);
        assert_eq!(nav.current_id().unwrap(), HOME);
        // Fallback re-initializes the current page.
        assert_eq!(home.init_count(), 2);
    }

    #[test]
    fn test_switch_to_unknown_page_on_empty_stack() {
        let nav = Navigator::new();
        let result = nav.switch_to(PageId::new("nope"));
        assert_eq!(result.unwrap_err(), NavigationError::EmptyStack);
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_current_on_empty_stack() {
        let nav = Navigator::new();
        assert_eq!(nav.current().err(), Some(NavigationError::EmptyStack));
        assert_eq!(nav.current_id(), Err(NavigationError::EmptyStack));
        assert_eq!(nav.switch_to_previous(), Err(NavigationError::EmptyStack));
    }

    #[test]
    fn test_current_is_stable() {
        let (nav, _, _) = navigator_with_home();
        let a = nav.current().unwrap();
        let b = nav.current().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_current_after_unregister_reports_unknown_page() {
        let (nav, _, _) = navigator_with_home();
        nav.unregister(HOME);
        assert_eq!(nav.current().err(), Some(NavigationError::UnknownPage(HOME)));
    }

    #[test]
    fn test_summary_and_busy_page() {
        let (nav, home, _) = navigator_with_home();
        home.set_value(7);
        assert_eq!(
            nav.summary(HOME),
            Some(PageSummary::Ready {
                label: "Home".into(),
                value: "7".into()
            })
        );

        let handle = nav.lookup(HOME).unwrap();
        let _busy = lock(&handle);
        assert_eq!(nav.summary(HOME), None);
        assert_eq!(nav.summary(PageId::new("missing")), None);
    }

    #[test]
    fn test_breadcrumbs() {
        let (nav, _, _) = navigator_with_home();
        nav.switch_to(SET_URL).unwrap();
        assert_eq!(nav.breadcrumbs(), vec!["Home", "Set Url"]);
    }

    #[test]
    fn test_navigation_error_display() {
        assert_eq!(
            NavigationError::EmptyStack.to_string(),
            "no pages in navigation stack"
        );
        assert_eq!(
            NavigationError::UnknownPage(HOME).to_string(),
            "page 'home' is not registered"
        );
    }
}
