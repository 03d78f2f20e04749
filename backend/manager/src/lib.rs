pub mod event_bus;
pub mod manager;
pub mod simulated;

pub use event_bus::{AddonEvent, EventBus};
pub use manager::{AddonManager, EventCallback, ManagerOptions};
pub use simulated::{FailurePoint, SimulatedHost, SimulationScript};
