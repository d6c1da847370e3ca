//! Pool engine: the manager and the workers it drives.

pub mod manager;
pub mod worker;

pub use manager::{DEFAULT_MAX_DELAY, MAX_WORKERS, Manager, ManagerConfig};
pub use worker::Worker;
