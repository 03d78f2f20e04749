use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A progress notification emitted by an install object.
///
/// The manager forwards these without looking inside; only status tracking
/// and logging read the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallEvent {
    /// Event-type identifier, e.g. `onDownloadProgress`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Bytes downloaded so far, when the host reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    /// Total download size, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u64>,
    /// Host-supplied failure detail for `*Failed` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl InstallEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            progress: None,
            max_progress: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn of_kind(kind: InstallEventKind) -> Self {
        Self::new(kind.as_str())
    }

    pub fn with_progress(mut self, progress: u64, max_progress: Option<u64>) -> Self {
        self.progress = Some(progress);
        self.max_progress = max_progress;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The well-known kind of this event, if it is one.
    pub fn kind(&self) -> Option<InstallEventKind> {
        self.event_type.parse().ok()
    }
}

/// Event names emitted by host install objects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum InstallEventKind {
    OnDownloadStarted,
    OnDownloadProgress,
    OnDownloadEnded,
    OnDownloadCancelled,
    OnDownloadFailed,
    OnInstallStarted,
    OnInstallEnded,
    OnInstallCancelled,
    OnInstallFailed,
}

impl InstallEventKind {
    /// Every kind, in the order listeners are registered by default.
    pub const ALL: [InstallEventKind; 9] = [
        InstallEventKind::OnDownloadStarted,
        InstallEventKind::OnDownloadProgress,
        InstallEventKind::OnDownloadEnded,
        InstallEventKind::OnDownloadCancelled,
        InstallEventKind::OnDownloadFailed,
        InstallEventKind::OnInstallStarted,
        InstallEventKind::OnInstallEnded,
        InstallEventKind::OnInstallCancelled,
        InstallEventKind::OnInstallFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallEventKind::OnDownloadStarted => "onDownloadStarted",
            InstallEventKind::OnDownloadProgress => "onDownloadProgress",
            InstallEventKind::OnDownloadEnded => "onDownloadEnded",
            InstallEventKind::OnDownloadCancelled => "onDownloadCancelled",
            InstallEventKind::OnDownloadFailed => "onDownloadFailed",
            InstallEventKind::OnInstallStarted => "onInstallStarted",
            InstallEventKind::OnInstallEnded => "onInstallEnded",
            InstallEventKind::OnInstallCancelled => "onInstallCancelled",
            InstallEventKind::OnInstallFailed => "onInstallFailed",
        }
    }

    /// Whether no further events follow this one for the same install.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstallEventKind::OnDownloadCancelled
                | InstallEventKind::OnDownloadFailed
                | InstallEventKind::OnInstallEnded
                | InstallEventKind::OnInstallCancelled
                | InstallEventKind::OnInstallFailed
        )
    }
}

impl std::fmt::Display for InstallEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known install event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown install event type: {0}")]
pub struct UnknownEventKind(pub String);

impl FromStr for InstallEventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstallEventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Ordered set of event-type identifiers to subscribe to on each install.
///
/// Entries are opaque strings; names outside [`InstallEventKind`] are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTypes(Vec<String>);

impl EventTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(types.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any entry names an event after which an install is settled.
    pub fn has_terminal(&self) -> bool {
        self.iter()
            .filter_map(|ty| ty.parse::<InstallEventKind>().ok())
            .any(|kind| kind.is_terminal())
    }
}

impl Default for EventTypes {
    fn default() -> Self {
        Self::new(InstallEventKind::ALL.iter().map(InstallEventKind::as_str))
    }
}

impl From<Vec<String>> for EventTypes {
    fn from(types: Vec<String>) -> Self {
        Self(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in InstallEventKind::ALL {
            assert_eq!(kind.as_str().parse::<InstallEventKind>().unwrap(), kind);
        }
        assert!("onSomethingElse".parse::<InstallEventKind>().is_err());
    }

    #[test]
    fn test_kind_display_matches_serde() {
        let json = serde_json::to_value(InstallEventKind::OnDownloadProgress).unwrap();
        assert_eq!(json, "onDownloadProgress");
        assert_eq!(InstallEventKind::OnInstallEnded.to_string(), "onInstallEnded");
    }

    #[test]
    fn test_default_event_types_order() {
        let types = EventTypes::default();
        assert_eq!(types.len(), 9);
        let first: Vec<&str> = types.iter().take(2).collect();
        assert_eq!(first, vec!["onDownloadStarted", "onDownloadProgress"]);
        assert_eq!(types.iter().last(), Some("onInstallFailed"));
    }

    #[test]
    fn test_event_serialization() {
        let event = InstallEvent::of_kind(InstallEventKind::OnDownloadProgress)
            .with_progress(50, Some(200));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "onDownloadProgress");
        assert_eq!(json["maxProgress"], 200);
        assert!(json.get("error").is_none());
        assert_eq!(event.kind(), Some(InstallEventKind::OnDownloadProgress));
    }

    #[test]
    fn test_has_terminal() {
        assert!(EventTypes::default().has_terminal());
        assert!(EventTypes::new(["onDownloadProgress", "onInstallEnded"]).has_terminal());
        assert!(!EventTypes::new(["onDownloadProgress", "onCustomDone"]).has_terminal());
        assert!(!EventTypes::new(Vec::<String>::new()).has_terminal());
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(InstallEventKind::OnInstallEnded.is_terminal());
        assert!(InstallEventKind::OnDownloadFailed.is_terminal());
        assert!(!InstallEventKind::OnDownloadEnded.is_terminal());
    }
}
