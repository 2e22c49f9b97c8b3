#![forbid(unsafe_code)]

//! Modal dialog stack controller.
//!
//! Tracks which modals are open and in what order, and routes two
//! cross-cutting behaviors to whichever modal is topmost:
//!
//! - **Escape to close**: key-release events whose key is `"Escape"` are
//!   forwarded to the active modal's [`ModalHandle::on_escape`].
//! - **Focus trap**: every document focus event (observed in the capture
//!   phase) is forwarded to the active modal's [`ModalHandle::on_trap_focus`].
//!
//! On close, focus is handed back either to the modal that becomes active
//! ([`ModalHandle::set_inner_focus`]) or, when the stack empties, to whatever
//! opened the chain ([`ModalHandle::release_focus`]).
//!
//! # Architecture
//!
//! [`ModalStack`] is a cheap `Clone` handle over `Rc<RefCell<..>>` state,
//! built once per application and passed to wherever modals open. The host
//! document is abstracted by [`HostDocument`]; listeners are registered on
//! the first push and kept alive by [`Subscription`] guards owned by the
//! controller.
//!
//! # Example
//!
//! ```ignore
//! let stack = ModalStack::new(document);
//! stack.push(confirm_dialog.clone());
//! // ... Escape pressed, dialog closes itself ...
//! stack.drop(&*confirm_dialog);
//! ```

pub mod config;
pub mod host;
pub mod modal;
pub mod stack;

pub use config::{DuplicatePush, StackConfig};
#[cfg(feature = "policy-config")]
pub use config::ConfigError;
pub use host::{Handler, HostDocument, KeyEventLike, Phase, Subscription};
pub use modal::{ModalHandle, ModalUid};
pub use stack::{DropOutcome, ModalStack, PushOutcome};

/// Key value reported by hosts for the Escape key.
pub const ESCAPE_KEY: &str = "Escape";
