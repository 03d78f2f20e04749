use thiserror::Error;

/// Top-level error type for add-on management.
#[derive(Debug, Error)]
pub enum AddonError {
    /// No host add-on manager was supplied at construction.
    #[error("mozAddonManager not available")]
    HostUnavailable,

    /// The host looked up the add-on but reported that removing it failed.
    #[error("Uninstall failed")]
    UninstallFailed,

    /// A failure raised by the host capability, passed through as-is.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl AddonError {
    /// Borrow the host's own error when this is a pass-through failure.
    pub fn host_error(&self) -> Option<&anyhow::Error> {
        match self {
            AddonError::Host(err) => Some(err),
            _ => None,
        }
    }
}
