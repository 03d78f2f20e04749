pub mod error;
pub mod event;
pub mod host;
pub mod outcome;
pub mod redact;
pub mod status;

pub use error::AddonError;
pub use event::{EventTypes, InstallEvent, InstallEventKind, UnknownEventKind};
pub use host::{AddonHandle, AddonHost, EventListener, InstallHandle, InstallRequest};
pub use outcome::{reconcile, UninstallOutcome};
pub use redact::redact_url;
pub use status::{InstallErrorCode, InstallState, InstallStatus};
