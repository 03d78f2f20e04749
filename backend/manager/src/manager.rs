//! Install/uninstall orchestration for a single add-on.
//!
//! `AddonManager` wraps a host add-on manager. `install()` subscribes to every
//! recognized event type on a fresh install object and then triggers it;
//! `uninstall()` turns the host's report into a plain success or failure.

use std::sync::Arc;

use addonforge_core::{
    outcome, redact_url, AddonError, AddonHandle, AddonHost, EventListener, EventTypes,
    InstallEvent, InstallHandle, InstallRequest,
};
use tracing::debug;

/// Receives every install event together with the add-on id.
pub type EventCallback = Arc<dyn Fn(InstallEvent, &str) + Send + Sync>;

/// Construction options.
#[derive(Clone, Default)]
pub struct ManagerOptions {
    /// The host add-on manager. Required.
    pub moz_addon_manager: Option<Arc<dyn AddonHost>>,
    /// Event types subscribed on each install object, in order.
    pub event_types: EventTypes,
}

impl ManagerOptions {
    pub fn with_host(host: Arc<dyn AddonHost>) -> Self {
        Self {
            moz_addon_manager: Some(host),
            event_types: EventTypes::default(),
        }
    }

    pub fn event_types(mut self, event_types: EventTypes) -> Self {
        self.event_types = event_types;
        self
    }
}

/// Forwards host events to the external callback, tagged with the add-on id.
struct EventSink {
    addon_id: String,
    callback: EventCallback,
}

impl EventSink {
    fn handle_event(&self, event: InstallEvent) {
        (self.callback)(event, self.addon_id.as_str());
    }
}

/// An install object with listeners attached for every recognized event type.
///
/// Installation can only be started from here, so no event is emitted before
/// the subscriptions exist.
struct SubscribedInstall {
    handle: Box<dyn InstallHandle>,
}

impl SubscribedInstall {
    fn subscribe(
        handle: Box<dyn InstallHandle>,
        event_types: &EventTypes,
        listener: EventListener,
    ) -> Self {
        for event_type in event_types.iter() {
            handle.add_event_listener(event_type, Arc::clone(&listener));
        }
        Self { handle }
    }

    fn start(self) {
        self.handle.install();
    }
}

/// Manages install and uninstall of one add-on through the host.
#[derive(Clone)]
pub struct AddonManager {
    sink: Arc<EventSink>,
    install_url: String,
    host: Arc<dyn AddonHost>,
    event_types: EventTypes,
}

impl AddonManager {
    /// Fails with [`AddonError::HostUnavailable`] when no host is supplied.
    pub fn new<F>(
        addon_id: impl Into<String>,
        install_url: impl Into<String>,
        event_callback: F,
        options: ManagerOptions,
    ) -> Result<Self, AddonError>
    where
        F: Fn(InstallEvent, &str) + Send + Sync + 'static,
    {
        let host = options.moz_addon_manager.ok_or(AddonError::HostUnavailable)?;
        Ok(Self {
            sink: Arc::new(EventSink {
                addon_id: addon_id.into(),
                callback: Arc::new(event_callback),
            }),
            install_url: install_url.into(),
            host,
            event_types: options.event_types,
        })
    }

    pub fn addon_id(&self) -> &str {
        &self.sink.addon_id
    }

    pub fn install_url(&self) -> &str {
        &self.install_url
    }

    pub fn event_types(&self) -> &EventTypes {
        &self.event_types
    }

    /// Pass one host event on to the callback. Callback panics are not caught.
    pub fn handle_event(&self, event: InstallEvent) {
        self.sink.handle_event(event);
    }

    /// Look the add-on up on the host. Every call is a fresh lookup.
    pub async fn get_addon(&self) -> Result<Option<Box<dyn AddonHandle>>, AddonError> {
        Ok(self.host.get_addon_by_id(self.addon_id()).await?)
    }

    /// Create an install object, subscribe to it, and trigger installation.
    ///
    /// Resolves once installation has been triggered. Completion is reported
    /// only through events. Host failures from `create_install` are returned
    /// unchanged.
    pub async fn install(&self) -> Result<(), AddonError> {
        debug!(addon = %self.addon_id(), url = %redact_url(&self.install_url), "Creating install");
        let handle = self
            .host
            .create_install(InstallRequest::new(self.install_url.clone()))
            .await?;

        let install = SubscribedInstall::subscribe(handle, &self.event_types, self.listener());
        debug!(
            addon = %self.addon_id(),
            listeners = self.event_types.len(),
            "Listeners attached; starting install"
        );
        install.start();
        Ok(())
    }

    /// Remove the add-on.
    ///
    /// An add-on that is not present counts as already uninstalled. An explicit
    /// `false` from the host becomes [`AddonError::UninstallFailed`]; a missing
    /// report counts as success.
    pub async fn uninstall(&self) -> Result<(), AddonError> {
        let Some(addon) = self.get_addon().await? else {
            debug!(addon = %self.addon_id(), "Add-on not present; nothing to uninstall");
            return Ok(());
        };
        debug!(addon = %addon.id(), "Uninstalling");
        outcome::reconcile(addon.uninstall().await)
    }

    fn listener(&self) -> EventListener {
        let sink = Arc::clone(&self.sink);
        Arc::new(move |event| sink.handle_event(event))
    }
}

impl std::fmt::Debug for AddonManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonManager")
            .field("addon_id", &self.sink.addon_id)
            .field("install_url", &redact_url(&self.install_url))
            .field("event_types", &self.event_types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeInstall {
        listeners: Mutex<Vec<(String, EventListener)>>,
        install_calls: Mutex<usize>,
        /// Listener count seen at the moment `install()` was called.
        listeners_at_start: Mutex<Option<usize>>,
    }

    impl FakeInstall {
        fn emit(&self, event_type: &str) {
            let listeners = self.listeners.lock().unwrap();
            for (ty, listener) in listeners.iter() {
                if ty == event_type {
                    listener(InstallEvent::new(event_type));
                }
            }
        }
    }

    /// Boxed view onto a shared `FakeInstall` so tests can inspect it afterwards.
    struct SharedInstall(Arc<FakeInstall>);

    impl InstallHandle for SharedInstall {
        fn add_event_listener(&self, event_type: &str, listener: EventListener) {
            self.0
                .listeners
                .lock()
                .unwrap()
                .push((event_type.to_string(), listener));
        }

        fn install(&self) {
            *self.0.install_calls.lock().unwrap() += 1;
            let attached = self.0.listeners.lock().unwrap().len();
            *self.0.listeners_at_start.lock().unwrap() = Some(attached);
        }
    }

    #[derive(Clone, Copy)]
    enum UninstallScript {
        Report(Option<bool>),
        Reject,
    }

    struct FakeAddon {
        id: String,
        script: UninstallScript,
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl AddonHandle for FakeAddon {
        fn id(&self) -> &str {
            &self.id
        }

        async fn uninstall(&self) -> Result<Option<bool>> {
            *self.calls.lock().unwrap() += 1;
            match self.script {
                UninstallScript::Report(report) => Ok(report),
                UninstallScript::Reject => Err(anyhow!("host refused: addon locked")),
            }
        }
    }

    #[derive(Default)]
    struct FakeHost {
        install: Arc<FakeInstall>,
        fail_create: bool,
        fail_lookup: bool,
        addon: Option<UninstallScript>,
        create_calls: Mutex<Vec<InstallRequest>>,
        lookups: Mutex<Vec<String>>,
        uninstall_calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl AddonHost for FakeHost {
        async fn create_install(&self, request: InstallRequest) -> Result<Box<dyn InstallHandle>> {
            self.create_calls.lock().unwrap().push(request);
            if self.fail_create {
                return Err(anyhow!("invalid package"));
            }
            Ok(Box::new(SharedInstall(Arc::clone(&self.install))))
        }

        async fn get_addon_by_id(&self, id: &str) -> Result<Option<Box<dyn AddonHandle>>> {
            self.lookups.lock().unwrap().push(id.to_string());
            if self.fail_lookup {
                return Err(anyhow!("lookup failed: host offline"));
            }
            Ok(self.addon.map(|script| {
                Box::new(FakeAddon {
                    id: id.to_string(),
                    script,
                    calls: Arc::clone(&self.uninstall_calls),
                }) as Box<dyn AddonHandle>
            }))
        }
    }

    type Seen = Arc<Mutex<Vec<(InstallEvent, String)>>>;

    fn manager_with(host: Arc<FakeHost>) -> (AddonManager, Seen) {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let manager = AddonManager::new(
            "test-id",
            "https://fake-install-url",
            move |event, id| sink.lock().unwrap().push((event, id.to_string())),
            ManagerOptions::with_host(host),
        )
        .unwrap();
        (manager, seen)
    }

    #[test]
    fn test_new_without_host_fails() {
        let err = AddonManager::new(
            "whatevs",
            "https://fake-install-url",
            |_, _| {},
            ManagerOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AddonError::HostUnavailable));
        assert!(err.to_string().contains("mozAddonManager not available"));
    }

    #[test]
    fn test_handle_event_passes_event_and_id() {
        let (manager, seen) = manager_with(Arc::new(FakeHost::default()));
        let event = InstallEvent::new("fakeEvent");
        manager.handle_event(event.clone());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, event);
        assert_eq!(seen[0].1, "test-id");
    }

    #[tokio::test]
    async fn test_get_addon_looks_up_by_id() {
        let host = Arc::new(FakeHost::default());
        let (manager, _) = manager_with(Arc::clone(&host));
        assert!(manager.get_addon().await.unwrap().is_none());
        assert_eq!(*host.lookups.lock().unwrap(), vec!["test-id".to_string()]);
    }

    #[tokio::test]
    async fn test_install_creates_with_url() {
        let host = Arc::new(FakeHost::default());
        let (manager, _) = manager_with(Arc::clone(&host));
        manager.install().await.unwrap();
        assert_eq!(
            *host.create_calls.lock().unwrap(),
            vec![InstallRequest::new("https://fake-install-url")]
        );
    }

    #[tokio::test]
    async fn test_install_attaches_one_listener_per_event_type() {
        let host = Arc::new(FakeHost::default());
        let (manager, _) = manager_with(Arc::clone(&host));
        manager.install().await.unwrap();

        let listeners = host.install.listeners.lock().unwrap();
        let types: Vec<&str> = listeners.iter().map(|(ty, _)| ty.as_str()).collect();
        let defaults = EventTypes::default();
        let expected: Vec<&str> = defaults.iter().collect();
        assert_eq!(types, expected);
    }

    #[tokio::test]
    async fn test_install_triggers_once_after_subscribing() {
        let host = Arc::new(FakeHost::default());
        let (manager, _) = manager_with(Arc::clone(&host));
        manager.install().await.unwrap();

        assert_eq!(*host.install.install_calls.lock().unwrap(), 1);
        assert_eq!(
            *host.install.listeners_at_start.lock().unwrap(),
            Some(EventTypes::default().len())
        );
    }

    #[tokio::test]
    async fn test_install_events_reach_callback() {
        let host = Arc::new(FakeHost::default());
        let (manager, seen) = manager_with(Arc::clone(&host));
        manager.install().await.unwrap();

        host.install.emit("onInstallEnded");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.event_type, "onInstallEnded");
        assert_eq!(seen[0].1, "test-id");
    }

    #[tokio::test]
    async fn test_install_passes_create_failure_through() {
        let host = Arc::new(FakeHost {
            fail_create: true,
            ..Default::default()
        });
        let (manager, _) = manager_with(Arc::clone(&host));
        let err = manager.install().await.unwrap_err();
        assert_eq!(err.to_string(), "invalid package");
        assert_eq!(*host.install.install_calls.lock().unwrap(), 0);
        assert!(host.install.listeners.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_install_scenario_with_custom_event_types() {
        let host = Arc::new(FakeHost::default());
        let manager = AddonManager::new(
            "ext-1",
            "https://example/ext.xpi",
            |_, _| {},
            ManagerOptions::with_host(host.clone())
                .event_types(EventTypes::new(["onDownloadProgress", "onInstallEnded"])),
        )
        .unwrap();
        manager.install().await.unwrap();

        assert_eq!(host.install.listeners.lock().unwrap().len(), 2);
        assert_eq!(*host.install.install_calls.lock().unwrap(), 1);
        assert_eq!(
            *host.create_calls.lock().unwrap(),
            vec![InstallRequest::new("https://example/ext.xpi")]
        );
    }

    #[tokio::test]
    async fn test_uninstall_resolves_when_addon_absent() {
        let host = Arc::new(FakeHost::default());
        let (manager, _) = manager_with(Arc::clone(&host));
        manager.uninstall().await.unwrap();
        assert_eq!(*host.uninstall_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_uninstall_rejects_on_false() {
        let host = Arc::new(FakeHost {
            addon: Some(UninstallScript::Report(Some(false))),
            ..Default::default()
        });
        let (manager, _) = manager_with(Arc::clone(&host));
        let err = manager.uninstall().await.unwrap_err();
        assert_eq!(err.to_string(), "Uninstall failed");
        assert_eq!(*host.uninstall_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_uninstall_resolves_on_true() {
        let host = Arc::new(FakeHost {
            addon: Some(UninstallScript::Report(Some(true))),
            ..Default::default()
        });
        let (manager, _) = manager_with(host);
        manager.uninstall().await.unwrap();
    }

    #[tokio::test]
    async fn test_uninstall_resolves_on_no_value() {
        let host = Arc::new(FakeHost {
            addon: Some(UninstallScript::Report(None)),
            ..Default::default()
        });
        let (manager, _) = manager_with(host);
        manager.uninstall().await.unwrap();
    }

    #[tokio::test]
    async fn test_uninstall_passes_rejection_through() {
        let host = Arc::new(FakeHost {
            addon: Some(UninstallScript::Reject),
            ..Default::default()
        });
        let (manager, _) = manager_with(host);
        let err = manager.uninstall().await.unwrap_err();
        assert!(!matches!(err, AddonError::UninstallFailed));
        assert_eq!(err.to_string(), "host refused: addon locked");
    }

    #[tokio::test]
    async fn test_uninstall_passes_lookup_failure_through() {
        let host = Arc::new(FakeHost {
            fail_lookup: true,
            addon: Some(UninstallScript::Report(Some(true))),
            ..Default::default()
        });
        let (manager, _) = manager_with(Arc::clone(&host));
        let err = manager.uninstall().await.unwrap_err();
        assert!(matches!(err, AddonError::Host(_)));
        assert_eq!(err.to_string(), "lookup failed: host offline");
        assert_eq!(*host.uninstall_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_debug_redacts_install_url() {
        let manager = AddonManager::new(
            "test-id",
            "https://cdn.example/ext.xpi?token=s3cret",
            |_, _| {},
            ManagerOptions::with_host(Arc::new(FakeHost::default())),
        )
        .unwrap();
        let printed = format!("{manager:?}");
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("token=[REDACTED]"));
    }

    #[tokio::test]
    async fn test_uninstall_looks_up_every_call() {
        let host = Arc::new(FakeHost {
            addon: Some(UninstallScript::Report(Some(true))),
            ..Default::default()
        });
        let (manager, _) = manager_with(Arc::clone(&host));
        manager.uninstall().await.unwrap();
        manager.uninstall().await.unwrap();
        assert_eq!(host.lookups.lock().unwrap().len(), 2);
        assert_eq!(*host.uninstall_calls.lock().unwrap(), 2);
    }
}
