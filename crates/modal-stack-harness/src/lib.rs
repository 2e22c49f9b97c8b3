#![forbid(unsafe_code)]

//! Test harness for `modal-stack`.
//!
//! - [`SyntheticDocument`]: a [`HostDocument`] that records every listener
//!   registration and lets tests fire key-up and focus events through the
//!   captured handlers, honoring phase order (capture before bubble).
//! - [`RecordingModal`]: a [`ModalHandle`] that logs each capability call,
//!   optionally closing itself on Escape like a real dialog.
//!
//! # Example
//!
//! ```
//! use modal_stack::ModalStack;
//! use modal_stack_harness::{RecordingModal, SyntheticDocument, Call};
//!
//! let stack = ModalStack::new(SyntheticDocument::new());
//! let dialog = RecordingModal::new("confirm");
//! stack.push(dialog.clone());
//!
//! stack.host().key_up("Escape");
//! assert_eq!(dialog.calls(), vec![Call::Escape("Escape".into())]);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use modal_stack::{
    Handler, HostDocument, KeyEventLike, ModalHandle, ModalStack, ModalUid, Phase, Subscription,
};

/// Synthetic key-release event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticKeyEvent {
    /// Key value, as a browser reports it.
    pub key: String,
}

impl SyntheticKeyEvent {
    /// Key release for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl KeyEventLike for SyntheticKeyEvent {
    fn key(&self) -> &str {
        &self.key
    }
}

/// Synthetic focus event naming the element that received focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticFocusEvent {
    /// Element id of the focus target.
    pub target: u64,
}

/// One listener registration seen by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Event stream the listener attached to.
    pub stream: EventStream,
    /// Phase it attached in.
    pub phase: Phase,
}

/// Event streams a [`SyntheticDocument`] exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStream {
    /// `keyup`
    KeyUp,
    /// `focus`
    Focus,
}

struct Listener<E> {
    id: u64,
    phase: Phase,
    handler: Handler<E>,
}

#[derive(Default)]
struct DocumentState {
    next_id: u64,
    key_up: Vec<Listener<SyntheticKeyEvent>>,
    focus: Vec<Listener<SyntheticFocusEvent>>,
    registrations: Vec<Registration>,
}

/// In-memory host document.
///
/// Cloning yields another handle to the same document.
#[derive(Clone, Default)]
pub struct SyntheticDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl std::fmt::Debug for SyntheticDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SyntheticDocument")
            .field("registrations", &state.registrations)
            .field("attached", &(state.key_up.len() + state.focus.len()))
            .finish()
    }
}

impl SyntheticDocument {
    /// Empty document with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration ever made, in order. Detaching does not erase history.
    pub fn registrations(&self) -> Vec<Registration> {
        self.state.borrow().registrations.clone()
    }

    /// Number of currently attached listeners on `stream`.
    pub fn attached(&self, stream: EventStream) -> usize {
        let state = self.state.borrow();
        match stream {
            EventStream::KeyUp => state.key_up.len(),
            EventStream::Focus => state.focus.len(),
        }
    }

    /// Fire a key-release event for `key`.
    pub fn key_up(&self, key: &str) {
        self.dispatch_key_up(&SyntheticKeyEvent::new(key));
    }

    /// Fire a key-release event.
    pub fn dispatch_key_up(&self, event: &SyntheticKeyEvent) {
        let handlers = phase_ordered(&self.state.borrow().key_up);
        for handler in handlers {
            handler(event);
        }
    }

    /// Fire a focus event targeting element `target`.
    pub fn focus(&self, target: u64) {
        let event = SyntheticFocusEvent { target };
        let handlers = phase_ordered(&self.state.borrow().focus);
        for handler in handlers {
            handler(&event);
        }
    }

    fn register(&self, stream: EventStream, phase: Phase) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.registrations.push(Registration { stream, phase });
        tracing::trace!(?stream, ?phase, "synthetic listener attached");
        state.next_id
    }

    fn detach_on_drop(&self, stream: EventStream, id: u64) -> Subscription {
        let weak = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                match stream {
                    EventStream::KeyUp => state.key_up.retain(|l| l.id != id),
                    EventStream::Focus => state.focus.retain(|l| l.id != id),
                }
            }
        })
    }
}

/// Snapshot handlers, capture listeners first, each group in attach order.
///
/// Snapshotting lets handlers attach or detach listeners while firing.
fn phase_ordered<E>(listeners: &[Listener<E>]) -> Vec<Handler<E>> {
    let capture = listeners.iter().filter(|l| l.phase == Phase::Capture);
    let bubble = listeners.iter().filter(|l| l.phase == Phase::Bubble);
    capture.chain(bubble).map(|l| Rc::clone(&l.handler)).collect()
}

impl HostDocument for SyntheticDocument {
    type KeyEvent = SyntheticKeyEvent;
    type FocusEvent = SyntheticFocusEvent;

    fn listen_key_up(&self, phase: Phase, handler: Handler<SyntheticKeyEvent>) -> Subscription {
        let id = self.register(EventStream::KeyUp, phase);
        self.state
            .borrow_mut()
            .key_up
            .push(Listener { id, phase, handler });
        self.detach_on_drop(EventStream::KeyUp, id)
    }

    fn listen_focus(&self, phase: Phase, handler: Handler<SyntheticFocusEvent>) -> Subscription {
        let id = self.register(EventStream::Focus, phase);
        self.state
            .borrow_mut()
            .focus
            .push(Listener { id, phase, handler });
        self.detach_on_drop(EventStream::Focus, id)
    }
}

/// A capability call observed by a [`RecordingModal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `on_escape` with the event's key.
    Escape(String),
    /// `on_trap_focus` with the event's target.
    TrapFocus(u64),
    /// `set_inner_focus`
    SetInnerFocus,
    /// `release_focus`
    ReleaseFocus,
}

/// Modal that records what the controller asked of it.
pub struct RecordingModal {
    uid: ModalUid,
    name: String,
    calls: RefCell<Vec<Call>>,
    close_on_escape: RefCell<Option<ModalStack<SyntheticDocument>>>,
    /// Last element inside the modal that held focus.
    inner_focus: Cell<Option<u64>>,
}

impl std::fmt::Debug for RecordingModal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingModal")
            .field("uid", &self.uid)
            .field("name", &self.name)
            .field("calls", &self.calls.borrow())
            .finish()
    }
}

impl RecordingModal {
    /// New modal with a fresh uid.
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Self::with_uid(name, ModalUid::next())
    }

    /// New modal with an explicit uid.
    pub fn with_uid(name: impl Into<String>, uid: ModalUid) -> Rc<Self> {
        Rc::new(Self {
            uid,
            name: name.into(),
            calls: RefCell::new(Vec::new()),
            close_on_escape: RefCell::new(None),
            inner_focus: Cell::new(None),
        })
    }

    /// Drop this modal from `stack` whenever Escape reaches it.
    pub fn close_on_escape(&self, stack: &ModalStack<SyntheticDocument>) {
        *self.close_on_escape.borrow_mut() = Some(stack.clone());
    }

    /// Stop closing on Escape. Also breaks the modal/stack reference cycle.
    pub fn detach_stack(&self) {
        self.close_on_escape.borrow_mut().take();
    }

    /// Uid this modal was created with.
    pub fn uid(&self) -> ModalUid {
        self.uid
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// How many recorded calls satisfy `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Last inner element observed through focus trapping.
    pub fn inner_focus(&self) -> Option<u64> {
        self.inner_focus.get()
    }

    fn record(&self, call: Call) {
        tracing::trace!(modal = %self.name, ?call, "modal capability invoked");
        self.calls.borrow_mut().push(call);
    }
}

impl ModalHandle<SyntheticDocument> for RecordingModal {
    fn uid(&self) -> ModalUid {
        self.uid
    }

    fn on_escape(&self, event: &SyntheticKeyEvent) {
        self.record(Call::Escape(event.key.clone()));
        let stack = self.close_on_escape.borrow().clone();
        if let Some(stack) = stack {
            stack.drop(self);
        }
    }

    fn on_trap_focus(&self, event: &SyntheticFocusEvent) {
        self.inner_focus.set(Some(event.target));
        self.record(Call::TrapFocus(event.target));
    }

    fn set_inner_focus(&self) {
        self.record(Call::SetInnerFocus);
    }

    fn release_focus(&self) {
        self.record(Call::ReleaseFocus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_fires_before_bubble() {
        let doc = SyntheticDocument::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&order);
        let _bubble = doc.listen_key_up(
            Phase::Bubble,
            Rc::new(move |_: &SyntheticKeyEvent| o.borrow_mut().push("bubble")),
        );
        let o = Rc::clone(&order);
        let _capture = doc.listen_key_up(
            Phase::Capture,
            Rc::new(move |_: &SyntheticKeyEvent| o.borrow_mut().push("capture")),
        );
        doc.key_up("a");
        assert_eq!(*order.borrow(), vec!["capture", "bubble"]);
    }

    #[test]
    fn subscription_drop_detaches() {
        let doc = SyntheticDocument::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = doc.listen_focus(
            Phase::Capture,
            Rc::new(move |_: &SyntheticFocusEvent| h.set(h.get() + 1)),
        );
        doc.focus(1);
        drop(sub);
        doc.focus(2);
        assert_eq!(hits.get(), 1);
        assert_eq!(doc.attached(EventStream::Focus), 0);
        assert_eq!(doc.registrations().len(), 1);
    }

    #[test]
    fn recording_modal_tracks_inner_focus() {
        let modal = RecordingModal::new("m");
        modal.on_trap_focus(&SyntheticFocusEvent { target: 9 });
        assert_eq!(modal.inner_focus(), Some(9));
        assert_eq!(modal.calls(), vec![Call::TrapFocus(9)]);
        modal.clear();
        assert!(modal.calls().is_empty());
    }
}
