//! Event Bus
//!
//! Fans install events out to any number of async subscribers. The bus hands
//! out a plain callback so it can sit behind `AddonManager::new`.

use addonforge_core::InstallEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// An install event tagged with the add-on it belongs to.
#[derive(Debug, Clone)]
pub struct AddonEvent {
    pub addon_id: String,
    pub event: InstallEvent,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AddonEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { sender: tx }
    }

    /// Dispatches an event to all current subscribers.
    pub fn publish(&self, addon_id: &str, event: InstallEvent) {
        trace!(addon = %addon_id, event = %event.event_type, "Publishing install event");
        // No subscribers is fine.
        let _ = self.sender.send(AddonEvent {
            addon_id: addon_id.to_string(),
            event,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AddonEvent> {
        self.sender.subscribe()
    }

    /// A callback that publishes every event it receives onto this bus.
    pub fn callback(&self) -> impl Fn(InstallEvent, &str) + Send + Sync + 'static {
        let bus = self.clone();
        move |event, addon_id| bus.publish(addon_id, event)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
