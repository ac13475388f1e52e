//! CloudSim Common Library
//!
//! In-memory resource stores for a simulated cloud provider, with simulated
//! provisioning lifecycles.

pub mod config;
pub mod domains;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod lifecycle;
pub mod seed;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{IdStrategy, LifecycleConfig, SimulatorConfig};
pub use error::{Error, Result};
pub use ids::{Clock, EpochMillisIds, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIds};
pub use inventory::{DomainSummary, Inventory};
pub use lifecycle::LifecycleSimulator;
pub use store::{ResourceStore, StoreOptions};
pub use types::*;

/// CloudSim version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path
pub fn default_config_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".cloudsim")
        .join("config.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
