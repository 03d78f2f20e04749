//! Add-on Event Logger
//!
//! Install progress and uninstall results as structured records on the
//! `addon_events` target.

use addonforge_core::{redact_url, InstallEvent};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    InstallRequested {
        url: String,
    },
    Progress {
        event_type: String,
        progress: Option<u64>,
        max_progress: Option<u64>,
        error: Option<String>,
    },
    UninstallRequested,
    Uninstalled,
    Failed {
        error_msg: String,
    },
}

impl From<&InstallEvent> for LifecycleEvent {
    fn from(event: &InstallEvent) -> Self {
        LifecycleEvent::Progress {
            event_type: event.event_type.clone(),
            progress: event.progress,
            max_progress: event.max_progress,
            error: event.error.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub addon_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: LifecycleEvent,
}

impl EventLogEntry {
    /// Build an entry, scrubbing any url it carries.
    pub fn new(addon_id: &str, mut event: LifecycleEvent) -> Self {
        if let LifecycleEvent::InstallRequested { url } = &mut event {
            *url = redact_url(url);
        }
        Self {
            addon_id: addon_id.to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_install_event(addon_id: &str, event: &InstallEvent) {
        Self::log_lifecycle(addon_id, LifecycleEvent::from(event));
    }

    pub fn log_lifecycle(addon_id: &str, event: LifecycleEvent) {
        let entry = EventLogEntry::new(addon_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_else(|_| format!("{:?}", entry));
        info!(target: "addon_events", addon = %entry.addon_id, entry = %json, "Add-on event");
    }
}
