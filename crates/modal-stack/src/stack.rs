#![forbid(unsafe_code)]

//! Modal stack controller.
//!
//! [`ModalStack`] keeps open modals in open order and routes Escape and
//! focus events to the topmost one.
//!
//! # Invariants
//!
//! - No uid appears twice in the stack.
//! - The most recently pushed, not yet dropped modal is always last.
//! - Only the active (last) modal receives escape and focus dispatch.
//! - Listeners are registered at most once per controller, on the first
//!   push, and stay attached for the controller's lifetime.
//! - Every successful drop makes exactly one focus hand-back call:
//!   `set_inner_focus` on the new active modal, or `release_focus` on the
//!   removed modal when nothing is left.
//!
//! # Failure Modes
//!
//! - `drop` for a uid that is not stacked is a no-op returning
//!   [`DropOutcome::NotFound`]; no other entry is touched.
//! - `push` for a uid that is already stacked returns
//!   [`PushOutcome::AlreadyOpen`] and never duplicates the entry.
//! - Dispatch with an empty stack does nothing.
//!
//! # Re-entrancy
//!
//! No `RefCell` borrow is held while a modal capability runs, so modals may
//! push, drop or query the stack from inside any callback.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::{DuplicatePush, StackConfig};
use crate::host::{HostDocument, KeyEventLike, Phase, Subscription};
use crate::modal::{ModalHandle, ModalUid};

/// Result of [`ModalStack::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The modal was appended and is now active.
    Pushed,
    /// The uid was already stacked; see [`DuplicatePush`] for what happened.
    AlreadyOpen,
}

/// Result of [`ModalStack::drop`], naming the focus hand-back that ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Another modal became active and had `set_inner_focus` called.
    Restored {
        /// The modal that is now active.
        active: ModalUid,
    },
    /// The stack is empty; the removed modal had `release_focus` called.
    Released,
    /// The uid was not stacked. Nothing changed.
    NotFound,
}

/// Shared controller state.
struct StackState<H: HostDocument> {
    /// Open modals, bottom to top.
    modals: Vec<Rc<dyn ModalHandle<H>>>,
    config: StackConfig,
    /// Host listeners, held for the controller's lifetime once registered.
    subscriptions: Vec<Subscription>,
    listening: bool,
}

impl<H: HostDocument> StackState<H> {
    fn position(&self, uid: ModalUid) -> Option<usize> {
        self.modals.iter().position(|m| m.uid() == uid)
    }
}

/// Stack of open modals with escape and focus routing.
///
/// Cloning yields another handle to the same stack.
pub struct ModalStack<H: HostDocument> {
    host: Rc<H>,
    state: Rc<RefCell<StackState<H>>>,
}

impl<H: HostDocument> Clone for ModalStack<H> {
    fn clone(&self) -> Self {
        Self {
            host: Rc::clone(&self.host),
            state: Rc::clone(&self.state),
        }
    }
}

impl<H: HostDocument> fmt::Debug for ModalStack<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ModalStack")
            .field(
                "modals",
                &state.modals.iter().map(|m| m.uid()).collect::<Vec<_>>(),
            )
            .field("listening", &state.listening)
            .field("config", &state.config)
            .finish()
    }
}

impl<H: HostDocument + 'static> ModalStack<H> {
    /// Create an empty stack bound to `host` with default settings.
    ///
    /// No listeners are registered until the first push.
    pub fn new(host: H) -> Self {
        Self::with_config(host, StackConfig::default())
    }

    /// Create an empty stack with explicit settings.
    pub fn with_config(host: H, config: StackConfig) -> Self {
        Self {
            host: Rc::new(host),
            state: Rc::new(RefCell::new(StackState {
                modals: Vec::new(),
                config,
                subscriptions: Vec::new(),
                listening: false,
            })),
        }
    }

    /// The host document this stack listens on.
    pub fn host(&self) -> &H {
        &self.host
    }

    // --- Stack Operations ---

    /// Push a modal that just became visible.
    ///
    /// Registers the host listeners on first use, then appends the modal so
    /// it becomes active.
    pub fn push(&self, modal: Rc<dyn ModalHandle<H>>) -> PushOutcome {
        self.ensure_listening();

        let uid = modal.uid();
        let mut state = self.state.borrow_mut();
        if let Some(idx) = state.position(uid) {
            match state.config.duplicate_push {
                DuplicatePush::Ignore => {
                    tracing::warn!(%uid, "push ignored: modal already open");
                }
                DuplicatePush::MoveToTop => {
                    let existing = state.modals.remove(idx);
                    state.modals.push(existing);
                    tracing::warn!(%uid, "push of open modal moved it to the top");
                }
            }
            return PushOutcome::AlreadyOpen;
        }

        state.modals.push(modal);
        tracing::debug!(%uid, depth = state.modals.len(), "modal pushed");
        PushOutcome::Pushed
    }

    /// Remove a closing modal and hand focus back.
    ///
    /// The entry is located by uid, so a modal below the top can be dropped
    /// without disturbing the order of the rest.
    pub fn drop(&self, modal: &dyn ModalHandle<H>) -> DropOutcome {
        self.drop_uid(modal.uid())
    }

    /// Same as [`drop`](Self::drop) when only the uid is at hand.
    pub fn drop_uid(&self, uid: ModalUid) -> DropOutcome {
        let (removed, active) = {
            let mut state = self.state.borrow_mut();
            let Some(idx) = state.position(uid) else {
                tracing::warn!(%uid, "drop ignored: modal not in stack");
                return DropOutcome::NotFound;
            };
            let removed = state.modals.remove(idx);
            tracing::debug!(%uid, depth = state.modals.len(), "modal dropped");
            (removed, state.modals.last().cloned())
        };

        match active {
            Some(active) => {
                active.set_inner_focus();
                DropOutcome::Restored {
                    active: active.uid(),
                }
            }
            None => {
                removed.release_focus();
                DropOutcome::Released
            }
        }
    }

    /// The topmost modal, if any.
    pub fn active(&self) -> Option<Rc<dyn ModalHandle<H>>> {
        self.state.borrow().modals.last().cloned()
    }

    // --- State Queries ---

    /// Uid of the topmost modal, if any.
    pub fn active_uid(&self) -> Option<ModalUid> {
        self.state.borrow().modals.last().map(|m| m.uid())
    }

    /// Number of open modals.
    #[inline]
    pub fn depth(&self) -> usize {
        self.state.borrow().modals.len()
    }

    /// Whether no modal is open.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().modals.is_empty()
    }

    /// Whether a modal with `uid` is open.
    pub fn contains(&self, uid: ModalUid) -> bool {
        self.state.borrow().position(uid).is_some()
    }

    /// Open modal uids, bottom to top.
    pub fn uids(&self) -> Vec<ModalUid> {
        self.state.borrow().modals.iter().map(|m| m.uid()).collect()
    }

    /// Whether host listeners have been registered.
    pub fn is_listening(&self) -> bool {
        self.state.borrow().listening
    }

    /// Current settings.
    pub fn config(&self) -> StackConfig {
        self.state.borrow().config.clone()
    }

    // --- Event Handling ---

    /// Register the key-up (bubble) and focus (capture) listeners once.
    ///
    /// Returns `true` if registration happened on this call. The listeners
    /// hold a weak reference to the stack and do nothing once it is gone.
    pub fn ensure_listening(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.listening {
                return false;
            }
            state.listening = true;
        }

        let weak: Weak<RefCell<StackState<H>>> = Rc::downgrade(&self.state);
        let key_up = {
            let weak = weak.clone();
            self.host.listen_key_up(
                Phase::Bubble,
                Rc::new(move |event: &H::KeyEvent| {
                    if let Some(state) = weak.upgrade() {
                        dispatch_key_up(&state, event);
                    }
                }),
            )
        };
        let focus = self.host.listen_focus(
            Phase::Capture,
            Rc::new(move |event: &H::FocusEvent| {
                if let Some(state) = weak.upgrade() {
                    dispatch_focus(&state, event);
                }
            }),
        );

        self.state.borrow_mut().subscriptions.extend([key_up, focus]);
        tracing::debug!("modal stack listeners registered");
        true
    }

    /// Key-release dispatch: forwards Escape to the active modal.
    pub fn handle_key_up(&self, event: &H::KeyEvent) {
        dispatch_key_up(&self.state, event);
    }

    /// Focus dispatch: forwards every focus event to the active modal.
    pub fn handle_focus(&self, event: &H::FocusEvent) {
        dispatch_focus(&self.state, event);
    }
}

fn dispatch_key_up<H: HostDocument>(state: &RefCell<StackState<H>>, event: &H::KeyEvent) {
    let active = {
        let state = state.borrow();
        if event.key() != state.config.escape_key {
            return;
        }
        state.modals.last().cloned()
    };
    if let Some(active) = active {
        tracing::trace!(uid = %active.uid(), "escape dispatched");
        active.on_escape(event);
    }
}

fn dispatch_focus<H: HostDocument>(state: &RefCell<StackState<H>>, event: &H::FocusEvent) {
    let active = state.borrow().modals.last().cloned();
    if let Some(active) = active {
        tracing::trace!(uid = %active.uid(), "focus trap dispatched");
        active.on_trap_focus(event);
    }
}
