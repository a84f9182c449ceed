#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! With instrumentation:
//!   cargo test -p gtree-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p gtree-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gtree_core::geometry::Rect;
use gtree_model::{TreeFilter, fixture_tree};
use gtree_render::frame::Frame;
use gtree_widgets::Widget;
use gtree_widgets::genealogy::{GenealogyState, GenealogyTree};
use gtree_widgets::layout::TreeLayout;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Captured {
    name: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
}

#[allow(dead_code)]
impl Captured {
    fn message(&self) -> &str {
        self.fields.get("message").map(String::as_str).unwrap_or("")
    }
}

/// Layer recording every span and event it sees.
struct Capture {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureHandle {
    fn spans(&self) -> Vec<Captured> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(Captured {
            name: attrs.metadata().name().to_string(),
            level: *attrs.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            name: event.metadata().name().to_string(),
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_capture<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { spans, events }
}

fn render_fixture(state: &mut GenealogyState) {
    let root = fixture_tree();
    let filter = TreeFilter::none();
    let area = Rect::new(0, 0, 100, 30);
    state.set_canvas(area);
    let layout = TreeLayout::compute(&root, state.expansion(), &filter);
    state.sync_layout(&layout);
    let mut frame = Frame::new(100, 30);
    GenealogyTree::new(&root, state, &filter).render(area, &mut frame);
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn layout_span_carries_root_id() {
    let handle = with_capture(|| {
        let mut state = GenealogyState::new(1);
        render_fixture(&mut state);
    });
    let spans = handle.spans();
    let layout: Vec<_> = spans.iter().filter(|s| s.name == "tree_layout").collect();
    assert!(!layout.is_empty(), "expected a tree_layout span, got {spans:?}");
    assert_eq!(layout[0].fields.get("root").map(String::as_str), Some("1"));
    assert_eq!(layout[0].level, tracing::Level::DEBUG);

    let events = handle.events();
    let computed = events
        .iter()
        .find(|e| e.message() == "layout computed")
        .expect("layout computed event");
    assert_eq!(computed.fields.get("cards").map(String::as_str), Some("3"));
}

#[test]
#[cfg(feature = "tracing")]
fn toggle_and_zoom_are_logged() {
    let handle = with_capture(|| {
        let mut state = GenealogyState::new(1);
        state.toggle(2);
        state.viewport_mut().zoom_out();
    });
    let events = handle.events();
    let toggled = events
        .iter()
        .find(|e| e.message() == "toggled node")
        .expect("toggle event");
    assert_eq!(toggled.fields.get("node").map(String::as_str), Some("2"));
    assert_eq!(toggled.fields.get("expanded").map(String::as_str), Some("true"));

    let zoom = events
        .iter()
        .find(|e| e.message() == "zoom out")
        .expect("zoom event");
    assert_eq!(zoom.fields.get("scale").map(String::as_str), Some("90"));
}

#[test]
#[cfg(feature = "tracing")]
fn fullscreen_failure_is_a_warning() {
    let handle = with_capture(|| {
        let mut state = GenealogyState::new(1);
        let request = state.viewport_mut().toggle_fullscreen();
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied by host");
        assert!(!state.viewport_mut().resolve_fullscreen(request, Err(err)));
        assert!(!state.viewport().is_fullscreen());
    });
    let events = handle.events();
    let warn = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warning event");
    assert_eq!(warn.message(), "fullscreen request failed");
    assert_eq!(
        warn.fields.get("error").map(String::as_str),
        Some("denied by host")
    );
}

#[test]
#[cfg(feature = "tracing")]
fn fullscreen_success_is_info() {
    let handle = with_capture(|| {
        let mut state = GenealogyState::new(1);
        let request = state.viewport_mut().toggle_fullscreen();
        assert!(state.viewport_mut().resolve_fullscreen(request, Ok(())));
    });
    let events = handle.events();
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::INFO && e.message() == "fullscreen changed")
    );
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
}

#[test]
fn zero_overhead_when_disabled() {
    // Without instrumentation the macros expand to nothing; with it, a
    // normal render must still stay below warning level.
    let handle = with_capture(|| {
        let mut state = GenealogyState::new(1);
        render_fixture(&mut state);
        state.toggle(2);
        render_fixture(&mut state);
    });
    assert!(
        handle
            .events()
            .iter()
            .all(|e| e.level != tracing::Level::WARN && e.level != tracing::Level::ERROR),
        "unexpected warnings: {:?}",
        handle.events()
    );
    if cfg!(feature = "tracing") {
        assert!(handle.spans().iter().any(|s| s.name == "tree_layout"));
    }
}
