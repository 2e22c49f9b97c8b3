#![forbid(unsafe_code)]

//! Structured log output for suspicious stack operations.

use std::sync::{Arc, Mutex};

use modal_stack::ModalStack;
use modal_stack_harness::{RecordingModal, SyntheticDocument};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;

#[derive(Debug, Clone)]
struct Captured {
    level: Level,
    message: String,
    uid: Option<String>,
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    uid: Option<String>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "uid" => self.uid = Some(format!("{value:?}")),
            _ => {}
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: visitor.message,
            uid: visitor.uid,
        });
    }
}

fn capture(f: impl FnOnce()) -> Vec<Captured> {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    events
}

fn warnings(events: &[Captured]) -> Vec<&Captured> {
    events.iter().filter(|e| e.level == Level::WARN).collect()
}

#[test]
fn unknown_drop_is_warned() {
    let events = capture(|| {
        let stack = ModalStack::new(SyntheticDocument::new());
        stack.push(RecordingModal::new("a"));
        let ghost = RecordingModal::with_uid("ghost", modal_stack::ModalUid::from_raw(u64::MAX));
        stack.drop(&*ghost);
    });

    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("not in stack"));
    assert_eq!(warns[0].uid.as_deref(), Some(format!("modal#{}", u64::MAX).as_str()));
}

#[test]
fn duplicate_push_is_warned() {
    let events = capture(|| {
        let stack = ModalStack::new(SyntheticDocument::new());
        let a = RecordingModal::new("a");
        stack.push(a.clone());
        stack.push(a.clone());
    });

    let warns = warnings(&events);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].message.contains("already open"));
}

#[test]
fn normal_lifecycle_has_no_warnings() {
    let events = capture(|| {
        let stack = ModalStack::new(SyntheticDocument::new());
        let a = RecordingModal::new("a");
        let b = RecordingModal::new("b");
        stack.push(a.clone());
        stack.push(b.clone());
        stack.host().key_up("Escape");
        stack.drop(&*b);
        stack.drop(&*a);
    });

    assert!(warnings(&events).is_empty());
    assert!(
        events
            .iter()
            .any(|e| e.level == Level::DEBUG && e.message.contains("listeners registered"))
    );
}
