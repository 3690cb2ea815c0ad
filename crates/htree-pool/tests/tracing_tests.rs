#![forbid(unsafe_code)]

//! Structured logging integration tests.
//!
//! These tests verify that settle passes run inside an `htree.settle` span
//! and that resets and pass summaries are reported as events.
//!
//!   cargo test -p htree-pool --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use htree_core::{BranchingFactor, NodeId};
use htree_pool::{Engine, EngineConfig, ViewportSimulator};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured span or event with its fields.
#[derive(Debug, Clone)]
struct Captured {
    name: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
    parent_name: Option<String>,
}

#[derive(Default)]
struct Store {
    spans: Vec<Captured>,
    events: Vec<Captured>,
}

/// A tracing Layer that records spans and events.
struct Capture {
    store: Arc<Mutex<Store>>,
}

/// Visitor that extracts fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
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
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let parent_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.store.lock().unwrap().spans.push(Captured {
            name: attrs.metadata().name().to_string(),
            level: *attrs.metadata().level(),
            fields: visitor.0.into_iter().collect(),
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let parent_name = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.store.lock().unwrap().events.push(Captured {
            name: fields.get("message").cloned().unwrap_or_default(),
            level: *event.metadata().level(),
            fields,
            parent_name,
        });
    }
}

fn with_capture<F>(f: F) -> Arc<Mutex<Store>>
where
    F: FnOnce(),
{
    let store = Arc::new(Mutex::new(Store::default()));
    let layer = Capture {
        store: store.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    store
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn settle_pass_runs_inside_span() {
    let store = with_capture(|| {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let mut view = ViewportSimulator::new(engine.branching_factor());
        engine.handle_settle(&mut view).unwrap();
        engine.handle_settle(&mut view).unwrap();
    });
    let store = store.lock().unwrap();

    let settles: Vec<&Captured> = store
        .spans
        .iter()
        .filter(|s| s.name == "htree.settle")
        .collect();
    assert_eq!(settles.len(), 2);
    assert_eq!(settles[0].level, tracing::Level::DEBUG);
    assert_eq!(settles[0].fields.get("pass").map(String::as_str), Some("0"));
    assert_eq!(settles[1].fields.get("pass").map(String::as_str), Some("1"));
    assert!(settles[0].parent_name.is_none());

    let summary = store
        .events
        .iter()
        .find(|e| e.name == "settle pass done")
        .expect("pass summary event");
    assert_eq!(summary.parent_name.as_deref(), Some("htree.settle"));
    assert_eq!(summary.fields.get("nearest").map(String::as_str), Some("1"));
    assert_eq!(summary.fields.get("prefetched").map(String::as_str), Some("6"));
}

#[test]
fn restart_is_logged_at_info() {
    let store = with_capture(|| {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.handle_open(&NodeId::root(), 1).unwrap();
        engine
            .set_branching_factor(BranchingFactor::new(3).unwrap())
            .unwrap();
    });
    let store = store.lock().unwrap();
    let restart = store
        .events
        .iter()
        .find(|e| e.name == "tree restarted")
        .expect("restart event");
    assert_eq!(restart.level, tracing::Level::INFO);
    assert_eq!(restart.fields.get("discarded").map(String::as_str), Some("3"));
}

#[test]
fn open_and_close_are_traced() {
    let store = with_capture(|| {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        engine.handle_open(&NodeId::root(), 1).unwrap();
        engine.handle_close(&"ab".parse().unwrap());
    });
    let store = store.lock().unwrap();
    let opened = store.events.iter().filter(|e| e.name == "opened").count();
    let closed: Vec<&Captured> = store.events.iter().filter(|e| e.name == "closed").collect();
    assert_eq!(opened, 3);
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].level, tracing::Level::TRACE);
    assert_eq!(closed[0].fields.get("node").map(String::as_str), Some("ab"));
}

#[test]
fn invalid_env_override_warns() {
    let store = with_capture(|| {
        let config = EngineConfig::from_env_with(|key| {
            (key == htree_pool::config::ENV_BRANCHING_FACTOR).then(|| "9".to_string())
        });
        assert_eq!(config.branching_factor, BranchingFactor::TWO);
    });
    let store = store.lock().unwrap();
    let warning = store
        .events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("warning event");
    assert_eq!(warning.fields.get("value").map(String::as_str), Some("9"));
}
