//! In-memory host add-on manager.
//!
//! Plays back a scripted download/install sequence on a tokio task so the
//! manager can be driven end to end without a real host. Nothing is persisted.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use addonforge_core::{
    redact_url, AddonHandle, AddonHost, EventListener, InstallEvent, InstallEventKind,
    InstallHandle, InstallRequest,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Stage at which a scripted install fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    Download,
    Install,
}

/// How the simulated host behaves.
#[derive(Debug, Clone)]
pub struct SimulationScript {
    /// Number of `onDownloadProgress` events per install.
    pub progress_steps: u32,
    /// Reported package size in bytes.
    pub package_size: u64,
    /// Pause between emitted events.
    pub step_delay: Duration,
    pub fail_at: Option<FailurePoint>,
    /// Value reported by an add-on's `uninstall()`.
    pub uninstall_report: Option<bool>,
}

impl Default for SimulationScript {
    fn default() -> Self {
        Self {
            progress_steps: 4,
            package_size: 1 << 20,
            step_delay: Duration::from_millis(50),
            fail_at: None,
            uninstall_report: Some(true),
        }
    }
}

#[derive(Default)]
struct HostState {
    /// Install url → add-on id.
    packages: Mutex<HashMap<String, String>>,
    installed: Mutex<HashSet<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Host that installs add-ons into an in-memory set.
#[derive(Clone)]
pub struct SimulatedHost {
    state: Arc<HostState>,
    script: SimulationScript,
}

impl SimulatedHost {
    pub fn new(script: SimulationScript) -> Self {
        Self {
            state: Arc::default(),
            script,
        }
    }

    /// Make `url` installable; installing it yields `addon_id`.
    pub fn register_package(&self, url: impl Into<String>, addon_id: impl Into<String>) {
        lock(&self.state.packages).insert(url.into(), addon_id.into());
    }

    /// Record an add-on as already installed.
    pub fn mark_installed(&self, addon_id: impl Into<String>) {
        lock(&self.state.installed).insert(addon_id.into());
    }

    pub fn is_installed(&self, addon_id: &str) -> bool {
        lock(&self.state.installed).contains(addon_id)
    }
}

#[async_trait]
impl AddonHost for SimulatedHost {
    async fn create_install(&self, request: InstallRequest) -> Result<Box<dyn InstallHandle>> {
        let Some(addon_id) = lock(&self.state.packages).get(&request.url).cloned() else {
            bail!("no add-on package available at {}", redact_url(&request.url));
        };
        let install = SimulatedInstall {
            id: Uuid::new_v4(),
            addon_id,
            listeners: Mutex::default(),
            state: Arc::clone(&self.state),
            script: self.script.clone(),
        };
        debug!(install = %install.id, addon = %install.addon_id, "Created simulated install");
        Ok(Box::new(install))
    }

    async fn get_addon_by_id(&self, id: &str) -> Result<Option<Box<dyn AddonHandle>>> {
        if !self.is_installed(id) {
            return Ok(None);
        }
        let addon: Box<dyn AddonHandle> = Box::new(SimulatedAddon {
            id: id.to_string(),
            state: Arc::clone(&self.state),
            report: self.script.uninstall_report,
        });
        Ok(Some(addon))
    }
}

struct SimulatedInstall {
    id: Uuid,
    addon_id: String,
    listeners: Mutex<Vec<(String, EventListener)>>,
    state: Arc<HostState>,
    script: SimulationScript,
}

impl InstallHandle for SimulatedInstall {
    fn add_event_listener(&self, event_type: &str, listener: EventListener) {
        lock(&self.listeners).push((event_type.to_string(), listener));
    }

    fn install(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(install = %self.id, "No tokio runtime; simulated install not started");
            return;
        };
        let playback = Playback {
            install_id: self.id,
            addon_id: self.addon_id.clone(),
            listeners: lock(&self.listeners).clone(),
            state: Arc::clone(&self.state),
            script: self.script.clone(),
        };
        runtime.spawn(playback.run());
    }
}

/// One scripted run of the download/install sequence.
struct Playback {
    install_id: Uuid,
    addon_id: String,
    listeners: Vec<(String, EventListener)>,
    state: Arc<HostState>,
    script: SimulationScript,
}

impl Playback {
    fn emit(&self, event: InstallEvent) {
        for (event_type, listener) in &self.listeners {
            if *event_type == event.event_type {
                listener(event.clone());
            }
        }
    }

    async fn pause(&self) {
        if !self.script.step_delay.is_zero() {
            tokio::time::sleep(self.script.step_delay).await;
        }
    }

    async fn run(self) {
        let size = self.script.package_size;
        let steps = u64::from(self.script.progress_steps.max(1));

        self.emit(InstallEvent::of_kind(InstallEventKind::OnDownloadStarted));
        for step in 1..=steps {
            self.pause().await;
            self.emit(
                InstallEvent::of_kind(InstallEventKind::OnDownloadProgress)
                    .with_progress(size * step / steps, Some(size)),
            );
        }
        if self.script.fail_at == Some(FailurePoint::Download) {
            self.emit(
                InstallEvent::of_kind(InstallEventKind::OnDownloadFailed)
                    .with_error("simulated download failure"),
            );
            return;
        }
        self.emit(InstallEvent::of_kind(InstallEventKind::OnDownloadEnded));

        self.pause().await;
        self.emit(InstallEvent::of_kind(InstallEventKind::OnInstallStarted));
        self.pause().await;
        if self.script.fail_at == Some(FailurePoint::Install) {
            self.emit(
                InstallEvent::of_kind(InstallEventKind::OnInstallFailed)
                    .with_error("simulated install failure"),
            );
            return;
        }
        lock(&self.state.installed).insert(self.addon_id.clone());
        info!(install = %self.install_id, addon = %self.addon_id, "Simulated install finished");
        self.emit(InstallEvent::of_kind(InstallEventKind::OnInstallEnded));
    }
}

struct SimulatedAddon {
    id: String,
    state: Arc<HostState>,
    report: Option<bool>,
}

#[async_trait]
impl AddonHandle for SimulatedAddon {
    fn id(&self) -> &str {
        &self.id
    }

    async fn uninstall(&self) -> Result<Option<bool>> {
        if self.report != Some(false) {
            lock(&self.state.installed).remove(&self.id);
        }
        Ok(self.report)
    }
}
