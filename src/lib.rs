pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::TomlConfig;

pub use adapters::ssh::SshShell;
pub use core::{executor::FanOutExecutor, plesk::PleskService, zone_master::ZoneMasterService};
pub use utils::error::{HostExecutionError, OpsError, Result};
