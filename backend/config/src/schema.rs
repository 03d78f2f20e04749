//! AddonForge configuration schema, typed for serde YAML/JSON.

use addonforge_core::{EventTypes, UninstallOutcome};
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonForgeConfig {
    /// The add-on being managed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon: Option<AddonConfig>,

    /// Event types subscribed on each install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<EventsConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Behaviour of the in-memory host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonConfig {
    pub id: String,
    pub install_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<EventTypes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `trace` | `debug` | `info` | `warn` | `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling JSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailAt {
    Download,
    Install,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_at: Option<FailAt>,
    /// What the host reports from `uninstall()`: confirmed, unreported or refused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall_report: Option<UninstallOutcome>,
}

impl AddonForgeConfig {
    pub fn event_types(&self) -> EventTypes {
        self.events
            .as_ref()
            .and_then(|e| e.types.clone())
            .unwrap_or_default()
    }
}
