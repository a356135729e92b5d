use crate::domain::model::{Command, Host, HostExecutionResult};
use crate::domain::ports::{CommandExecutor, RemoteShell};
use crate::utils::error::HostExecutionError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Runs a command on every host concurrently, one task per host, and waits
/// for all of them. Dropping the returned future aborts every session still
/// in flight.
pub struct FanOutExecutor<S: RemoteShell> {
    shell: Arc<S>,
    per_host_timeout: Duration,
}

impl<S: RemoteShell> FanOutExecutor<S> {
    pub fn new(shell: S, per_host_timeout: Duration) -> Self {
        Self {
            shell: Arc::new(shell),
            per_host_timeout,
        }
    }

    pub fn per_host_timeout(&self) -> Duration {
        self.per_host_timeout
    }
}

impl<S: RemoteShell> Clone for FanOutExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            shell: Arc::clone(&self.shell),
            per_host_timeout: self.per_host_timeout,
        }
    }
}

#[async_trait]
impl<S: RemoteShell> CommandExecutor for FanOutExecutor<S> {
    async fn execute_on_hosts(
        &self,
        hosts: &[Host],
        command: &Command,
    ) -> HashMap<Host, HostExecutionResult> {
        let mut sessions = JoinSet::new();

        for host in hosts {
            let shell = Arc::clone(&self.shell);
            let host = host.clone();
            let command = command.clone();
            let limit = self.per_host_timeout;

            sessions.spawn(async move {
                let outcome = match tokio::time::timeout(limit, shell.run(&host, &command)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(HostExecutionError::Timeout(limit)),
                };
                HostExecutionResult { host, outcome }
            });
        }

        let mut results = HashMap::with_capacity(hosts.len());
        while let Some(joined) = sessions.join_next().await {
            // A panicked task has no result; it is filled in below.
            if let Ok(result) = joined {
                results.insert(result.host.clone(), result);
            }
        }

        for host in hosts {
            results
                .entry(host.clone())
                .or_insert_with(|| HostExecutionResult {
                    host: host.clone(),
                    outcome: Err(HostExecutionError::Aborted),
                });
        }

        results
    }
}
