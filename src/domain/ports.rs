use crate::domain::model::{Command, Host, HostExecutionResult};
use crate::utils::error::HostExecutionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Runs one command on one host and returns its standard output.
#[async_trait]
pub trait RemoteShell: Send + Sync + 'static {
    async fn run(&self, host: &Host, command: &Command) -> Result<String, HostExecutionError>;
}

/// Runs one command on many hosts. Never fails as a whole: every host gets
/// an entry in the returned map, successful or not.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute_on_hosts(
        &self,
        hosts: &[Host],
        command: &Command,
    ) -> HashMap<Host, HostExecutionResult>;
}

pub trait ConfigProvider: Send + Sync {
    fn name_servers(&self) -> &[Host];
    fn plesk_servers(&self) -> &[Host];
    fn command_timeout(&self) -> Duration;
}
