//! Structured logging for AddonForge.
//!
//! Sets up console and rolling JSON file output, records install events, and
//! scrubs credentials from package urls before they reach a log line.

pub mod event_logger;
pub mod logger;

pub use event_logger::{EventLogEntry, EventLogger, LifecycleEvent};
pub use logger::{init_logger, LogGuard};
pub use addonforge_core::redact_url;
