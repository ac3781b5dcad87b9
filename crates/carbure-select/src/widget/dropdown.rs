//! Open/closed state of a dropdown.

use carbure_core::logging::targets;
use carbure_core::{Signal, State};

/// Open state of a dropdown, controlled or uncontrolled.
pub struct Dropdown {
    open: State<bool>,
    /// Emitted when the dropdown opens.
    pub opened: Signal<()>,
    /// Emitted when the dropdown closes.
    pub closed: Signal<()>,
}

impl Default for Dropdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Dropdown {
    /// A closed, self-managed dropdown.
    pub fn new() -> Self {
        Self::with_state(State::uncontrolled(false))
    }

    /// A dropdown whose open state belongs to the caller.
    ///
    /// Requests go to `on_change`; the caller pushes the new state back with
    /// [`sync`](Self::sync).
    pub fn controlled<F>(open: bool, on_change: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self::with_state(State::controlled(open, on_change))
    }

    fn with_state(open: State<bool>) -> Self {
        Self {
            open,
            opened: Signal::new(),
            closed: Signal::new(),
        }
    }

    /// Returns true while open.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Returns true if the caller owns the open state.
    pub fn is_controlled(&self) -> bool {
        self.open.is_controlled()
    }

    /// Request opening.
    pub fn open(&mut self) {
        self.request(true);
    }

    /// Request closing.
    pub fn close(&mut self) {
        self.request(false);
    }

    /// Request the opposite state.
    pub fn toggle(&mut self) {
        let open = !self.is_open();
        self.request(open);
    }

    /// Apply the open state pushed by a controlling parent.
    pub fn sync(&mut self, open: bool) {
        if self.open.is_controlled() && self.open.get() != open {
            self.open.sync(open);
            self.notify(open);
        }
    }

    fn request(&mut self, open: bool) {
        if self.open.set(open) {
            self.notify(open);
        }
    }

    fn notify(&self, open: bool) {
        tracing::trace!(target: targets::WIDGET, open, "dropdown toggled");
        if open {
            self.opened.emit(());
        } else {
            self.closed.emit(());
        }
    }
}

impl std::fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dropdown")
            .field("open", &self.is_open())
            .field("controlled", &self.is_controlled())
            .finish()
    }
}
