//! CLI Install / Cycle Commands
//!
//! Drives an `AddonManager` against the in-memory host and follows the event
//! stream until the install settles.

use std::sync::Arc;
use std::time::Duration;

use addonforge_config::{AddonForgeConfig, FailAt};
use addonforge_core::{AddonError, InstallState, InstallStatus, UninstallOutcome};
use addonforge_logging::{EventLogger, LifecycleEvent};
use addonforge_manager::{
    AddonEvent, AddonManager, EventBus, FailurePoint, ManagerOptions, SimulatedHost,
    SimulationScript,
};
use anyhow::{bail, Result};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::terminal_output::{note_error, note_info, note_success, status_line};

/// Add-on to act on, after CLI flags are merged over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub url: String,
}

impl Target {
    pub fn resolve(
        config: &AddonForgeConfig,
        id: Option<String>,
        url: Option<String>,
    ) -> Result<Self> {
        let addon = config.addon.as_ref();
        let Some(id) = id.or_else(|| addon.map(|a| a.id.clone())).filter(|s| !s.is_empty()) else {
            bail!("No add-on id configured; pass --id or set addon.id");
        };
        let Some(url) = url
            .or_else(|| addon.map(|a| a.install_url.clone()))
            .filter(|s| !s.is_empty())
        else {
            bail!("No install url configured; pass --url or set addon.installUrl");
        };
        Ok(Self { id, url })
    }
}

/// Command-line overrides of the simulation section.
#[derive(Debug, Clone, Default)]
pub struct SimulationOverrides {
    pub fail_at: Option<FailAt>,
    pub uninstall_report: Option<UninstallOutcome>,
}

pub fn build_script(config: &AddonForgeConfig, overrides: &SimulationOverrides) -> SimulationScript {
    let defaults = SimulationScript::default();
    let sim = config.simulation.clone().unwrap_or_default();
    let fail_at = overrides.fail_at.or(sim.fail_at).map(|f| match f {
        FailAt::Download => FailurePoint::Download,
        FailAt::Install => FailurePoint::Install,
    });
    let uninstall_report = overrides
        .uninstall_report
        .or(sim.uninstall_report)
        .map(|o| o.as_report())
        .unwrap_or(defaults.uninstall_report);

    SimulationScript {
        progress_steps: sim.progress_steps.unwrap_or(defaults.progress_steps),
        package_size: sim.package_size.unwrap_or(defaults.package_size),
        step_delay: sim
            .step_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.step_delay),
        fail_at,
        uninstall_report,
    }
}

/// Shortest wait for the next install event before giving up.
const MIN_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait between install events for a given script.
fn idle_timeout(script: &SimulationScript) -> Duration {
    MIN_IDLE_TIMEOUT + script.step_delay.saturating_mul(4)
}

/// A manager wired to a simulated host and an event bus.
struct Session {
    manager: AddonManager,
    events: broadcast::Receiver<AddonEvent>,
    idle: Duration,
}

impl Session {
    fn open(config: &AddonForgeConfig, target: &Target, overrides: &SimulationOverrides) -> Result<Self> {
        let event_types = config.event_types();
        if !event_types.has_terminal() {
            bail!("events.types lists no terminal event type; install completion cannot be observed");
        }
        let script = build_script(config, overrides);
        let idle = idle_timeout(&script);
        let host = SimulatedHost::new(script);
        host.register_package(&target.url, &target.id);

        let bus = EventBus::new();
        let events = bus.subscribe();
        let publish = bus.callback();
        let manager = AddonManager::new(
            &target.id,
            &target.url,
            move |event, addon_id| {
                EventLogger::log_install_event(addon_id, &event);
                publish(event, addon_id);
            },
            ManagerOptions::with_host(Arc::new(host)).event_types(event_types),
        )?;
        Ok(Self {
            manager,
            events,
            idle,
        })
    }

    /// Install and follow events until the install succeeds or fails.
    async fn install(&mut self) -> Result<InstallState> {
        let addon_id = self.manager.addon_id().to_string();
        EventLogger::log_lifecycle(
            &addon_id,
            LifecycleEvent::InstallRequested {
                url: self.manager.install_url().to_string(),
            },
        );
        self.manager.install().await?;
        follow_events(&mut self.events, &addon_id, self.idle).await
    }

    async fn uninstall(&self, state: &mut InstallState) -> Result<()> {
        let addon_id = self.manager.addon_id();
        EventLogger::log_lifecycle(addon_id, LifecycleEvent::UninstallRequested);
        state.mark_uninstalling();
        match self.manager.uninstall().await {
            Ok(()) => {
                state.mark_uninstalled();
                EventLogger::log_lifecycle(addon_id, LifecycleEvent::Uninstalled);
                Ok(())
            }
            Err(err) => {
                if matches!(err, AddonError::UninstallFailed) {
                    state.status = InstallStatus::Installed;
                }
                EventLogger::log_lifecycle(
                    addon_id,
                    LifecycleEvent::Failed {
                        error_msg: err.to_string(),
                    },
                );
                Err(err.into())
            }
        }
    }
}

/// Fold events for `addon_id` into a state until a terminal event arrives.
///
/// Fails when the stream closes or stays quiet for longer than `idle`.
async fn follow_events(
    events: &mut broadcast::Receiver<AddonEvent>,
    addon_id: &str,
    idle: Duration,
) -> Result<InstallState> {
    let mut state = InstallState::new(addon_id);
    loop {
        let received = match tokio::time::timeout(idle, events.recv()).await {
            Ok(Ok(received)) => received,
            Ok(Err(RecvError::Lagged(skipped))) => {
                warn!(skipped, "Event receiver lagged");
                continue;
            }
            Ok(Err(RecvError::Closed)) => bail!("Event stream closed before install settled"),
            Err(_) => bail!(
                "No install event for {addon_id} within {}s; last status {}",
                idle.as_secs(),
                state.status
            ),
        };
        if received.addon_id != addon_id {
            continue;
        }
        state.apply(&received.event);
        note_info(&status_line(&state));
        if received.event.kind().is_some_and(|k| k.is_terminal()) {
            return Ok(state);
        }
    }
}

pub async fn run_install(
    config: &AddonForgeConfig,
    target: &Target,
    overrides: &SimulationOverrides,
) -> Result<()> {
    let mut session = Session::open(config, target, overrides)?;
    let state = session.install().await?;
    report_install(&state)
}

/// Install, then uninstall, reporting each step.
pub async fn run_cycle(
    config: &AddonForgeConfig,
    target: &Target,
    overrides: &SimulationOverrides,
) -> Result<()> {
    let mut session = Session::open(config, target, overrides)?;
    let mut state = session.install().await?;
    report_install(&state)?;

    match session.uninstall(&mut state).await {
        Ok(()) => {
            note_success(&format!("Uninstalled {}", target.id));
            Ok(())
        }
        Err(err) => {
            note_error(&format!("Uninstall of {} failed: {err}", target.id));
            Err(err)
        }
    }
}

fn report_install(state: &InstallState) -> Result<()> {
    if state.status == InstallStatus::Installed {
        note_success(&format!("Installed {}", state.addon_id));
        return Ok(());
    }
    note_error(&status_line(state));
    bail!("Install of {} did not complete ({})", state.addon_id, state.status)
}
