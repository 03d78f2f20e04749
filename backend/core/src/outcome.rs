//! Reconciliation of host uninstall reports.

use serde::{Deserialize, Serialize};

use crate::error::AddonError;

/// What the host said after removing an add-on.
///
/// Hosts may finish without any value, which counts as success and must not
/// be confused with an explicit `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UninstallOutcome {
    /// Host reported `true`.
    Confirmed,
    /// Host finished without a value.
    Unreported,
    /// Host reported `false`.
    Refused,
}

impl UninstallOutcome {
    pub fn from_report(report: Option<bool>) -> Self {
        match report {
            Some(true) => UninstallOutcome::Confirmed,
            None => UninstallOutcome::Unreported,
            Some(false) => UninstallOutcome::Refused,
        }
    }

    /// The host report this outcome was built from.
    pub fn as_report(&self) -> Option<bool> {
        match self {
            UninstallOutcome::Confirmed => Some(true),
            UninstallOutcome::Unreported => None,
            UninstallOutcome::Refused => Some(false),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, UninstallOutcome::Refused)
    }

    pub fn into_result(self) -> Result<(), AddonError> {
        match self {
            UninstallOutcome::Refused => Err(AddonError::UninstallFailed),
            UninstallOutcome::Confirmed | UninstallOutcome::Unreported => Ok(()),
        }
    }
}

impl From<Option<bool>> for UninstallOutcome {
    fn from(report: Option<bool>) -> Self {
        Self::from_report(report)
    }
}

/// Collapse a settled host uninstall call into resolve or reject.
///
/// A rejected call keeps the host's error untouched.
pub fn reconcile(settled: anyhow::Result<Option<bool>>) -> Result<(), AddonError> {
    UninstallOutcome::from_report(settled?).into_result()
}
