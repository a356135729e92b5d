pub mod command;
pub mod executor;
pub mod plesk;
pub mod zone_master;

pub use crate::domain::model::{
    Command, Domain, Host, HostExecutionResult, RemovalOutcome, SubscriptionInfo, ZoneMasterAnswer,
    ZoneMasterReport, ZoneMasterStatus,
};
pub use crate::domain::ports::{CommandExecutor, ConfigProvider, RemoteShell};
pub use crate::utils::error::Result;
