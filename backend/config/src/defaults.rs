//! Config defaults: fills in values the user left out.

use crate::schema::{AddonForgeConfig, EventsConfig, LoggingConfig, SimulationConfig};
use addonforge_core::{EventTypes, UninstallOutcome};

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_PROGRESS_STEPS: u32 = 4;

/// 1 MiB.
pub const DEFAULT_PACKAGE_SIZE: u64 = 1 << 20;

pub const DEFAULT_STEP_DELAY_MS: u64 = 50;

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: AddonForgeConfig) -> AddonForgeConfig {
    let config = apply_event_defaults(config);
    let config = apply_logging_defaults(config);
    apply_simulation_defaults(config)
}

fn apply_event_defaults(mut config: AddonForgeConfig) -> AddonForgeConfig {
    let events = config.events.get_or_insert_with(EventsConfig::default);
    if events.types.is_none() {
        events.types = Some(EventTypes::default());
    }
    config
}

fn apply_logging_defaults(mut config: AddonForgeConfig) -> AddonForgeConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(DEFAULT_LOG_DIR.to_string());
    }
    config
}

fn apply_simulation_defaults(mut config: AddonForgeConfig) -> AddonForgeConfig {
    let sim = config.simulation.get_or_insert_with(SimulationConfig::default);
    sim.progress_steps.get_or_insert(DEFAULT_PROGRESS_STEPS);
    sim.package_size.get_or_insert(DEFAULT_PACKAGE_SIZE);
    sim.step_delay_ms.get_or_insert(DEFAULT_STEP_DELAY_MS);
    sim.uninstall_report.get_or_insert(UninstallOutcome::Confirmed);
    config
}
