//! Config validation with path-qualified messages.

use std::collections::HashSet;

use crate::schema::AddonForgeConfig;
use addonforge_core::InstallEventKind;
use thiserror::Error;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &AddonForgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_addon(config, &mut report);
    validate_events(config, &mut report);
    validate_logging(config, &mut report);
    validate_simulation(config, &mut report);
    report
}

fn validate_addon(config: &AddonForgeConfig, report: &mut ValidationReport) {
    let Some(addon) = &config.addon else {
        report.warn("addon", "No add-on configured; pass --id and --url");
        return;
    };
    if addon.id.trim().is_empty() {
        report.error("addon.id", "Add-on id cannot be empty");
    }
    let url = addon.install_url.trim();
    if url.is_empty() {
        report.error("addon.installUrl", "Install url cannot be empty");
    } else if !["https://", "http://", "file://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
    {
        report.warn(
            "addon.installUrl",
            format!("Unusual install url scheme: {url}"),
        );
    }
}

fn validate_events(config: &AddonForgeConfig, report: &mut ValidationReport) {
    let Some(types) = config.events.as_ref().and_then(|e| e.types.as_ref()) else {
        return;
    };
    if !types.has_terminal() {
        report.error(
            "events.types",
            "No terminal event type listed; an install would never report completion",
        );
    }
    let mut seen = HashSet::new();
    for (i, event_type) in types.iter().enumerate() {
        let path = format!("events.types[{i}]");
        if !seen.insert(event_type) {
            report.warn(&path, format!("Duplicate event type '{event_type}'"));
        }
        if event_type.parse::<InstallEventKind>().is_err() {
            report.warn(&path, format!("Unknown event type '{event_type}'"));
        }
    }
}

fn validate_logging(config: &AddonForgeConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else {
        return;
    };
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.error(
            "logging.level",
            format!("Invalid log level '{level}'; expected one of {}", LOG_LEVELS.join(", ")),
        );
    }
}

fn validate_simulation(config: &AddonForgeConfig, report: &mut ValidationReport) {
    let Some(sim) = &config.simulation else { return };
    if sim.progress_steps == Some(0) {
        report.warn("simulation.progressSteps", "Zero steps; one progress event is still sent");
    }
    if sim.package_size == Some(0) {
        report.warn("simulation.packageSize", "Package size is zero");
    }
}
