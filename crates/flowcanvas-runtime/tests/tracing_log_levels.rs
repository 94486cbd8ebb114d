#![forbid(unsafe_code)]

//! Log levels, fields, and span nesting emitted by the runtime.
//!
//! History changes log at DEBUG with depth fields, evictions at TRACE, and
//! selection delivery inside a `selection.notify` span.
//!
//! Run:
//!   cargo test -p flowcanvas-runtime --test tracing_log_levels

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

use flowcanvas_core::{IdKind, Node, PipelineFlow, SequentialIdGenerator};
use flowcanvas_runtime::commands::CreateNodeCmd;
use flowcanvas_runtime::{
    CommandStack, HistoryConfig, NodeTemplate, ObjectModel, SelectionChangeEvent, SelectionQueue,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    message: String,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

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

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        let parent_span_name = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());

        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
            parent_span_name,
        });
    }
}

/// Run `f` under a registry filtered by `directives` and return every event
/// that got through.
fn capture(directives: &str, f: impl FnOnce()) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(EventCapture {
            events: Arc::clone(&events),
        });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn named<'a>(events: &'a [CapturedEvent], message: &str) -> Vec<&'a CapturedEvent> {
    events.iter().filter(|e| e.message == message).collect()
}

fn model() -> ObjectModel {
    ObjectModel::new(PipelineFlow::new("flow", "main")).with_id_generator(Box::new(SequentialIdGenerator::new()))
}

fn create(model: &mut ObjectModel, stack: &mut CommandStack<ObjectModel>, label: &str) {
    let node = Node::new(model.allocate_id(IdKind::Node)).with_label(label);
    let cmd = CreateNodeCmd::new(model, "main", node).unwrap();
    stack.execute(Box::new(cmd), model).unwrap();
}

// ============================================================================
// History
// ============================================================================

#[test]
fn history_changes_log_at_debug_with_depths() {
    let events = capture("flowcanvas_runtime=trace", || {
        let mut model = model();
        let mut stack = CommandStack::new(HistoryConfig::default());
        create(&mut model, &mut stack, "Read");
        stack.undo(&mut model).unwrap().unwrap();
        stack.redo(&mut model).unwrap().unwrap();
    });

    let executed = named(&events, "executed command");
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].level, tracing::Level::DEBUG);
    assert_eq!(executed[0].fields["description"], "Create node 'Read'");
    assert_eq!(executed[0].fields["undo_depth"], "1");
    assert_eq!(executed[0].fields["redo_depth"], "0");

    let undone = named(&events, "undid command");
    assert_eq!(undone.len(), 1);
    assert_eq!(undone[0].fields["undo_depth"], "0");
    assert_eq!(undone[0].fields["redo_depth"], "1");
    assert_eq!(named(&events, "redid command").len(), 1);
}

#[test]
fn eviction_is_trace_and_filtered_at_debug() {
    let run = || {
        let mut model = model();
        let mut stack = CommandStack::new(HistoryConfig::new(1));
        create(&mut model, &mut stack, "a");
        create(&mut model, &mut stack, "b");
    };

    let verbose = capture("flowcanvas_runtime=trace", run);
    let evicted = named(&verbose, "evicted oldest undo entry");
    assert_eq!(evicted.len(), 1);
    assert_eq!(evicted[0].level, tracing::Level::TRACE);

    let quiet = capture("flowcanvas_runtime=debug", run);
    assert!(named(&quiet, "evicted oldest undo entry").is_empty());
    assert_eq!(named(&quiet, "executed command").len(), 2);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn selection_delivery_is_traced_inside_its_span() {
    let events = capture("flowcanvas_runtime=trace", || {
        let mut model = model();
        let node = model.create_node("main", NodeTemplate::new("n")).unwrap();
        model.add_node("main", node.clone()).unwrap();
        model.set_selection_callback(Box::new(|_event: &SelectionChangeEvent, _queue: &mut SelectionQueue| {}));
        model.set_selections("main", vec![node.id]).unwrap();
        model.clear_selection();
    });

    let delivered = named(&events, "notifying selection observer");
    assert_eq!(delivered.len(), 2);
    for event in delivered {
        assert_eq!(event.level, tracing::Level::TRACE);
        assert_eq!(event.parent_span_name.as_deref(), Some("selection.notify"));
    }
    assert_eq!(named(&events, "notifying selection observer")[0].fields["added_nodes"], "1");
}
