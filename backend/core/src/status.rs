//! Install status derived from the host's event stream.

use serde::{Deserialize, Serialize};

use crate::event::{InstallEvent, InstallEventKind};

/// Where an add-on is in its lifecycle, as far as observed events tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallStatus {
    #[default]
    Unknown,
    Downloading,
    Installing,
    Installed,
    Uninstalling,
    Uninstalled,
    Error,
}

impl std::fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallErrorCode {
    DownloadFailed,
    InstallFailed,
}

/// Folded view of one add-on's install progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallState {
    pub addon_id: String,
    pub status: InstallStatus,
    /// Percentage, 0–100.
    pub download_progress: u8,
    pub error: Option<InstallErrorCode>,
}

impl InstallState {
    pub fn new(addon_id: impl Into<String>) -> Self {
        Self {
            addon_id: addon_id.into(),
            status: InstallStatus::Unknown,
            download_progress: 0,
            error: None,
        }
    }

    /// Advance the state with one event. Unrecognized event types are ignored.
    pub fn apply(&mut self, event: &InstallEvent) {
        let Some(kind) = event.kind() else { return };
        match kind {
            InstallEventKind::OnDownloadStarted => {
                self.status = InstallStatus::Downloading;
                self.download_progress = 0;
                self.error = None;
            }
            InstallEventKind::OnDownloadProgress => {
                self.status = InstallStatus::Downloading;
                self.download_progress = percentage(event.progress, event.max_progress);
            }
            InstallEventKind::OnDownloadEnded => {
                self.status = InstallStatus::Installing;
                self.download_progress = 100;
            }
            InstallEventKind::OnInstallStarted => {
                self.status = InstallStatus::Installing;
            }
            InstallEventKind::OnInstallEnded => {
                self.status = InstallStatus::Installed;
                self.error = None;
            }
            InstallEventKind::OnDownloadFailed => {
                self.status = InstallStatus::Error;
                self.error = Some(InstallErrorCode::DownloadFailed);
            }
            InstallEventKind::OnInstallFailed => {
                self.status = InstallStatus::Error;
                self.error = Some(InstallErrorCode::InstallFailed);
            }
            InstallEventKind::OnDownloadCancelled | InstallEventKind::OnInstallCancelled => {
                self.status = InstallStatus::Unknown;
                self.download_progress = 0;
            }
        }
    }

    pub fn mark_uninstalling(&mut self) {
        self.status = InstallStatus::Uninstalling;
    }

    pub fn mark_uninstalled(&mut self) {
        self.status = InstallStatus::Uninstalled;
        self.download_progress = 0;
        self.error = None;
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self.status,
            InstallStatus::Installed | InstallStatus::Uninstalled | InstallStatus::Error
        )
    }
}

fn percentage(progress: Option<u64>, max_progress: Option<u64>) -> u8 {
    match (progress, max_progress) {
        (Some(done), Some(total)) if total > 0 => {
            let pct = done.saturating_mul(100) / total;
            pct.min(100) as u8
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: InstallEventKind) -> InstallEvent {
        InstallEvent::of_kind(kind)
    }

    #[test]
    fn test_happy_path() {
        let mut state = InstallState::new("ext-1");
        state.apply(&event(InstallEventKind::OnDownloadStarted));
        assert_eq!(state.status, InstallStatus::Downloading);

        state.apply(&event(InstallEventKind::OnDownloadProgress).with_progress(30, Some(120)));
        assert_eq!(state.download_progress, 25);

        state.apply(&event(InstallEventKind::OnDownloadEnded));
        assert_eq!(state.status, InstallStatus::Installing);
        assert_eq!(state.download_progress, 100);

        state.apply(&event(InstallEventKind::OnInstallEnded));
        assert_eq!(state.status, InstallStatus::Installed);
        assert!(state.is_settled());
    }

    #[test]
    fn test_progress_without_total_is_zero() {
        let mut state = InstallState::new("ext-1");
        state.apply(&event(InstallEventKind::OnDownloadProgress).with_progress(30, None));
        assert_eq!(state.download_progress, 0);
        state.apply(&event(InstallEventKind::OnDownloadProgress).with_progress(500, Some(100)));
        assert_eq!(state.download_progress, 100);
    }

    #[test]
    fn test_failures_record_error_code() {
        let mut state = InstallState::new("ext-1");
        state.apply(&event(InstallEventKind::OnDownloadFailed).with_error("404"));
        assert_eq!(state.status, InstallStatus::Error);
        assert_eq!(state.error, Some(InstallErrorCode::DownloadFailed));

        state.apply(&event(InstallEventKind::OnDownloadStarted));
        assert_eq!(state.error, None);
        state.apply(&event(InstallEventKind::OnInstallFailed));
        assert_eq!(state.error, Some(InstallErrorCode::InstallFailed));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let mut state = InstallState::new("ext-1");
        state.apply(&event(InstallEventKind::OnInstallStarted));
        let before = state.clone();
        state.apply(&InstallEvent::new("onSomethingNew"));
        assert_eq!(state, before);
    }

    #[test]
    fn test_uninstall_marks() {
        let mut state = InstallState::new("ext-1");
        state.apply(&event(InstallEventKind::OnInstallEnded));
        state.mark_uninstalling();
        assert!(!state.is_settled());
        state.mark_uninstalled();
        assert_eq!(state.status.to_string(), "uninstalled");
    }
}
