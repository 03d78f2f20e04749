//! The host add-on management capability.
//!
//! Install and uninstall mechanics live entirely behind these traits; the
//! manager only sequences calls against them.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::event::InstallEvent;

/// Listener attached to an install object for one event type.
pub type EventListener = Arc<dyn Fn(InstallEvent) + Send + Sync>;

/// Argument to [`AddonHost::create_install`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRequest {
    pub url: String,
}

impl InstallRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Host-provided add-on manager.
#[async_trait]
pub trait AddonHost: Send + Sync {
    /// Prepare an install object for the package at `request.url`.
    async fn create_install(&self, request: InstallRequest) -> Result<Box<dyn InstallHandle>>;

    /// Look up an installed add-on. `Ok(None)` means it is not present.
    async fn get_addon_by_id(&self, id: &str) -> Result<Option<Box<dyn AddonHandle>>>;
}

/// One in-progress installation, owned by the host.
pub trait InstallHandle: Send + Sync {
    /// Register `listener` for events named `event_type`.
    fn add_event_listener(&self, event_type: &str, listener: EventListener);

    /// Start installing. Progress is reported through listeners only.
    fn install(&self);
}

/// An installed add-on, owned by the host.
#[async_trait]
pub trait AddonHandle: Send + Sync {
    fn id(&self) -> &str;

    /// Ask the host to remove this add-on.
    ///
    /// `Ok(Some(false))` is an explicit refusal; `Ok(None)` means the host
    /// finished without reporting a value.
    async fn uninstall(&self) -> Result<Option<bool>>;
}
