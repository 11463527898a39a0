//! Tracing utilities for asserting on classifier logging.
//!
//! Classifiers emit events rather than spans, so this layer records every
//! event whose target belongs to the `sieve` crates.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Captured event information for testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// The event target (e.g., "sieve::concurrent")
    pub target: String,
    /// The `message` field
    pub message: String,
    /// Remaining field values as strings
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Value of a captured field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A tracing layer that captures `sieve` events.
pub struct EventCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value.to_string());
    }
}

impl<S> Layer<S> for EventCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("sieve") {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        lock(&self.events).push(CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

fn lock(events: &Mutex<Vec<CapturedEvent>>) -> MutexGuard<'_, Vec<CapturedEvent>> {
    events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Collector for captured events.
#[derive(Clone)]
pub struct EventCollector {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
    dispatch: Dispatch,
}

impl std::fmt::Debug for EventCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCollector")
            .field("events", &lock(&self.events).len())
            .finish()
    }
}

impl Default for EventCollector {
    fn default() -> Self {
        create_event_collector()
    }
}

/// Create a new event collector with its associated dispatch.
pub fn create_event_collector() -> EventCollector {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCaptureLayer {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(layer);
    EventCollector {
        events,
        dispatch: Dispatch::new(subscriber),
    }
}

impl EventCollector {
    /// Get the dispatch for use with spawned tasks.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this collector as the default subscriber.
    pub fn capture<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Get all captured events.
    pub fn events(&self) -> Vec<CapturedEvent> {
        lock(&self.events).clone()
    }

    /// Get captured messages in order.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .map(|event| event.message.clone())
            .collect()
    }

    /// Get the last event with the given message.
    pub fn last(&self, message: &str) -> Option<CapturedEvent> {
        lock(&self.events)
            .iter()
            .rev()
            .find(|event| event.message == message)
            .cloned()
    }

    /// Number of events with the given message.
    pub fn count(&self, message: &str) -> usize {
        lock(&self.events)
            .iter()
            .filter(|event| event.message == message)
            .count()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

/// Run a closure with event capturing enabled.
///
/// Returns the result of the closure and a collector with captured events.
pub fn with_event_capture<F, R>(f: F) -> (R, EventCollector)
where
    F: FnOnce() -> R,
{
    let collector = create_event_collector();
    let result = collector.capture(f);
    (result, collector)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sieve::prelude::*;

    use super::*;

    #[test]
    fn test_captures_override_events() {
        let (classifier, collector) = with_event_capture(|| {
            let mut classifier = Classifier::with_default(Policy::Exclude);
            classifier.include(1).exclude(1);
            classifier
        });

        assert!(classifier.is_explicitly_excluded(&1));
        assert_eq!(collector.count("override registered"), 2);

        let last = collector.last("override registered").unwrap();
        assert_eq!(last.level, Level::TRACE);
        assert_eq!(last.target, "sieve::classifier");
        assert_eq!(last.field("policy"), Some("exclude"));
        assert_eq!(last.field("replaced"), Some("Some(Include)"));
    }

    #[test]
    fn test_captures_reset_and_clear() {
        let ((), collector) = with_event_capture(|| {
            let classifier = ConcurrentClassifier::new();
            classifier.include("a").include("b");
            classifier.reset(&"a");
            classifier.reset(&"missing");
            classifier.clear();
        });

        let resets: Vec<_> = collector
            .events()
            .into_iter()
            .filter(|event| event.message == "override reset")
            .map(|event| event.field("removed").map(str::to_owned))
            .collect();
        assert_eq!(
            resets,
            vec![Some("true".to_owned()), Some("false".to_owned())]
        );

        let cleared = collector.last("concurrent classifier cleared").unwrap();
        assert_eq!(cleared.level, Level::DEBUG);
        assert_eq!(cleared.field("removed"), Some("1"));
    }

    #[test]
    fn test_rejected_mutation_warns() {
        let (result, collector) = with_event_capture(|| {
            let mut view = Classifier::<u8>::new().read_only();
            view.try_reset(&0)
        });

        assert!(result.is_err());
        let warning = collector
            .last("mutation rejected by read-only classifier")
            .unwrap();
        assert_eq!(warning.level, Level::WARN);
        assert_eq!(warning.field("operation"), Some("reset"));
    }

    #[test]
    fn test_queries_are_silent() {
        let mut classifier = Classifier::with_default(Policy::Include);
        classifier.exclude(3);

        let (answers, collector) = with_event_capture(|| {
            (
                classifier.should_include(&3),
                classifier.any_included([1, 2, 3]),
                classifier.explicit_excluded_items().count(),
            )
        });

        assert_eq!(answers, (false, true, 1));
        assert!(collector.events().is_empty());
    }
}
