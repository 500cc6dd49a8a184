//! Event Bus implementation.
//!
//! Provides the EventBus struct owned by the printer model for
//! distributing model events to any number of observers.

use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, PrinterEvent};
use crate::data::PrinterState;
use crate::types::DataCallback;

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new unique subscription ID
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific events
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
    /// Receive only transitions into any of these states.
    States(Vec<PrinterState>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &PrinterEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::States(states) => match event {
                PrinterEvent::StateChanged { current, .. } => states.contains(current),
                _ => false,
            },
        }
    }
}

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Central event bus for printer model events
///
/// Handlers run on the publishing thread while the handler table is
/// read-locked; a handler must not subscribe or unsubscribe.
pub struct EventBus {
    /// Broadcast channel sender
    sender: broadcast::Sender<PrinterEvent>,
    /// Registered synchronous handlers
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, DataCallback<PrinterEvent>)>>,
    /// Configuration
    config: EventBusConfig,
}

impl EventBus {
    /// Create a new event bus with default configuration
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// Create a new event bus with custom configuration
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of handlers and receivers that were notified.
    pub fn publish(&self, event: PrinterEvent) -> usize {
        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (filter, handler) in handlers.values() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }

        // No receivers is not an error; synchronous handlers may be all there is.
        delivered + self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events with a synchronous handler
    ///
    /// The handler is called inline from the model's mutating call, so it
    /// should return quickly.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(PrinterEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Box::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for manual event polling
    ///
    /// This is useful for async contexts where events are consumed in a
    /// separate task.
    pub fn receiver(&self) -> broadcast::Receiver<PrinterEvent> {
        self.sender.subscribe()
    }

    /// Unsubscribe from events
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    /// Get the number of active handler subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Get the current configuration
    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PowerStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn state_event(current: PrinterState) -> PrinterEvent {
        PrinterEvent::StateChanged {
            previous: PrinterState::Disconnected,
            current,
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();

        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);

        // Double unsubscribe should return false
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_event_delivery() {
        let bus = EventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        bus.subscribe(EventFilter::All, move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(bus.publish(state_event(PrinterState::Ready)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(state_event(PrinterState::Ready)), 0);
    }

    #[test]
    fn test_state_filtering() {
        let bus = EventBus::new();
        let printing = Arc::new(AtomicUsize::new(0));
        let power = Arc::new(AtomicUsize::new(0));

        let p = printing.clone();
        bus.subscribe(EventFilter::States(vec![PrinterState::Printing]), move |_| {
            p.fetch_add(1, Ordering::SeqCst);
        });
        let pw = power.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Power]),
            move |_| {
                pw.fetch_add(1, Ordering::SeqCst);
            },
        );

        bus.publish(state_event(PrinterState::Ready));
        bus.publish(state_event(PrinterState::Printing));
        bus.publish(PrinterEvent::PowerChanged {
            device: "printer".to_string(),
            status: PowerStatus::On,
        });

        assert_eq!(printing.load(Ordering::SeqCst), 1);
        assert_eq!(power.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_filter_matches() {
        let event = state_event(PrinterState::Paused);

        assert!(EventFilter::All.matches(&event));
        assert!(EventFilter::Categories(vec![EventCategory::State]).matches(&event));
        assert!(!EventFilter::Categories(vec![EventCategory::Config]).matches(&event));
        assert!(EventFilter::States(vec![PrinterState::Paused]).matches(&event));
        assert!(!EventFilter::States(vec![PrinterState::Ready]).matches(&event));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        bus.publish(state_event(PrinterState::Startup));

        match receiver.recv().await {
            Ok(PrinterEvent::StateChanged { current, .. }) => {
                assert_eq!(current, PrinterState::Startup)
            }
            other => panic!("Wrong event received: {:?}", other),
        }
    }
}
