#![forbid(unsafe_code)]

//! Browser host for `modal-stack`.
//!
//! [`WebDocument`] implements [`HostDocument`] over a `web_sys::Document`:
//! `keyup` listeners go through `addEventListener(.., false)` and `focus`
//! listeners through `addEventListener(.., true)`, so focus moves anywhere
//! in the page are seen during capture even though `focus` does not bubble.
//!
//! Each registration owns its `Closure`; dropping the returned
//! [`Subscription`] removes the listener and frees the closure.
//!
//! ```ignore
//! let document = WebDocument::from_window().expect("running in a browser");
//! let stack = ModalStack::new(document);
//! ```

use modal_stack::{Handler, HostDocument, KeyEventLike, Phase, Subscription};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::{Closure, WasmClosure};
use web_sys::{Document, EventTarget, FocusEvent, KeyboardEvent};

/// DOM event name for key releases.
pub const KEY_UP: &str = "keyup";
/// DOM event name for focus moves.
pub const FOCUS: &str = "focus";

/// Key value of a DOM keyboard event.
///
/// `web_sys::KeyboardEvent::key` returns an owned `String`, which
/// [`KeyEventLike`] cannot borrow from, so the value is cached when the event
/// is wrapped.
#[derive(Debug, Clone)]
pub struct WebKeyEvent {
    key: String,
    event: KeyboardEvent,
}

impl WebKeyEvent {
    /// Wrap a DOM keyboard event.
    pub fn new(event: KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            event,
        }
    }

    /// The underlying DOM event.
    pub fn event(&self) -> &KeyboardEvent {
        &self.event
    }
}

impl KeyEventLike for WebKeyEvent {
    fn key(&self) -> &str {
        &self.key
    }
}

/// Host document backed by the browser DOM.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    /// Wrap a document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current window's document, or `None` outside a browser.
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    /// The wrapped document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn attach<F: ?Sized + WasmClosure + 'static>(
        &self,
        name: &'static str,
        phase: Phase,
        closure: Closure<F>,
    ) -> Subscription {
        let target: EventTarget = self.document.clone().into();
        let capture = phase.use_capture();
        if let Err(err) = target.add_event_listener_with_callback_and_bool(
            name,
            closure.as_ref().unchecked_ref(),
            capture,
        ) {
            tracing::warn!(event = name, ?err, "failed to attach document listener");
            return Subscription::detached();
        }
        tracing::debug!(event = name, capture, "document listener attached");

        Subscription::new(move || {
            if let Err(err) = target.remove_event_listener_with_callback_and_bool(
                name,
                closure.as_ref().unchecked_ref(),
                capture,
            ) {
                tracing::warn!(event = name, ?err, "failed to detach document listener");
            }
            drop(closure);
        })
    }
}

impl HostDocument for WebDocument {
    type KeyEvent = WebKeyEvent;
    type FocusEvent = FocusEvent;

    fn listen_key_up(&self, phase: Phase, handler: Handler<WebKeyEvent>) -> Subscription {
        let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            handler(&WebKeyEvent::new(event));
        });
        self.attach(KEY_UP, phase, closure)
    }

    fn listen_focus(&self, phase: Phase, handler: Handler<FocusEvent>) -> Subscription {
        let closure = Closure::<dyn FnMut(FocusEvent)>::new(move |event: FocusEvent| {
            handler(&event);
        });
        self.attach(FOCUS, phase, closure)
    }
}
