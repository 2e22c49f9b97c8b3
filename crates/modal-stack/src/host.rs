#![forbid(unsafe_code)]

//! Host document abstraction.
//!
//! The controller needs exactly two event streams from its host: key
//! releases (bubble phase) and focus moves (capture phase). A
//! [`HostDocument`] registers handlers for them and hands back a
//! [`Subscription`] per registration.
//!
//! # Invariants
//!
//! 1. A registered handler stays attached until its `Subscription` drops.
//! 2. Dropping a `Subscription` runs the host's detach routine exactly once.
//! 3. Events are delivered one at a time, read-only.

use std::fmt;
use std::rc::Rc;

/// Event propagation phase a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Observed on the way down, before the target sees it.
    Capture,
    /// Observed on the way back up from the target.
    Bubble,
}

impl Phase {
    /// The `useCapture` flag a DOM-style host expects.
    #[inline]
    #[must_use]
    pub const fn use_capture(self) -> bool {
        matches!(self, Self::Capture)
    }
}

/// Read access to the key name of a host key event.
pub trait KeyEventLike {
    /// Key value, e.g. `"Escape"` or `"a"`.
    fn key(&self) -> &str;
}

impl KeyEventLike for str {
    fn key(&self) -> &str {
        self
    }
}

impl KeyEventLike for String {
    fn key(&self) -> &str {
        self
    }
}

/// Shared event callback.
pub type Handler<E> = Rc<dyn Fn(&E)>;

/// A document-like event source.
pub trait HostDocument {
    /// Event type delivered for key releases.
    type KeyEvent: KeyEventLike + 'static;
    /// Event type delivered for focus moves.
    type FocusEvent: 'static;

    /// Attach `handler` to key-release events in `phase`.
    fn listen_key_up(&self, phase: Phase, handler: Handler<Self::KeyEvent>) -> Subscription;

    /// Attach `handler` to focus events in `phase`.
    fn listen_focus(&self, phase: Phase, handler: Handler<Self::FocusEvent>) -> Subscription;
}

impl<H: HostDocument + ?Sized> HostDocument for Rc<H> {
    type KeyEvent = H::KeyEvent;
    type FocusEvent = H::FocusEvent;

    fn listen_key_up(&self, phase: Phase, handler: Handler<Self::KeyEvent>) -> Subscription {
        (**self).listen_key_up(phase, handler)
    }

    fn listen_focus(&self, phase: Phase, handler: Handler<Self::FocusEvent>) -> Subscription {
        (**self).listen_focus(phase, handler)
    }
}

/// RAII guard for a host listener registration.
///
/// Dropping it detaches the listener.
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap the host's detach routine.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to undo.
    pub fn detached() -> Self {
        Self { detach: None }
    }

    /// Keep the listener attached for the rest of the process.
    pub fn forget(mut self) {
        self.detach = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn drop_runs_detach_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = Subscription::new(move || c.set(c.get() + 1));
        assert_eq!(count.get(), 0);
        drop(sub);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn forget_skips_detach() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        Subscription::new(move || c.set(c.get() + 1)).forget();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn detached_debug() {
        let sub = Subscription::detached();
        assert_eq!(format!("{sub:?}"), "Subscription { attached: false }");
    }

    #[test]
    fn phase_capture_flag() {
        assert!(Phase::Capture.use_capture());
        assert!(!Phase::Bubble.use_capture());
    }

    #[test]
    fn string_is_key_event() {
        assert_eq!(String::from("Escape").key(), "Escape");
        assert_eq!("Tab".key(), "Tab");
    }
}
