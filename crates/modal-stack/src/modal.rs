#![forbid(unsafe_code)]

//! Modal capability contract.
//!
//! The controller never owns modal state. It holds shared handles and calls
//! back into them through [`ModalHandle`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::host::HostDocument;

/// Global counter for unique modal uids.
static MODAL_UID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of an open modal instance.
///
/// Used only for equality and lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalUid(u64);

impl ModalUid {
    /// Allocate a new process-unique uid.
    #[must_use]
    pub fn next() -> Self {
        Self(MODAL_UID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap an id from a caller-owned id space.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModalUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// Capabilities the stack controller invokes on a modal.
///
/// All methods take `&self`: modals are shared (`Rc<dyn ModalHandle<H>>`)
/// and keep their own state behind interior mutability. The controller
/// holds no borrow of its own state while calling any of these, so an
/// implementation may call back into the stack (for example, `on_escape`
/// dropping itself).
pub trait ModalHandle<H: HostDocument + ?Sized> {
    /// Identity of this open instance. Must stay the same while it is stacked.
    fn uid(&self) -> ModalUid;

    /// Escape was released while this modal is active. The modal decides
    /// whether and how to close.
    fn on_escape(&self, event: &H::KeyEvent);

    /// A focus event happened somewhere in the document while this modal is
    /// active. Pull focus back if it left the modal's boundary.
    fn on_trap_focus(&self, event: &H::FocusEvent);

    /// This modal is active again after a modal above it closed. Restore the
    /// inner element that last held focus.
    fn set_inner_focus(&self);

    /// This modal closed and nothing remains underneath. Restore focus to
    /// the element that opened it.
    fn release_focus(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_uids_are_unique() {
        let a = ModalUid::next();
        let b = ModalUid::next();
        let c = ModalUid::next();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(a < b && b < c);
    }

    #[test]
    fn raw_roundtrip_and_display() {
        let uid = ModalUid::from_raw(42);
        assert_eq!(uid.get(), 42);
        assert_eq!(uid.to_string(), "modal#42");
        assert_eq!(uid, ModalUid::from_raw(42));
    }
}
