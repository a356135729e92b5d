use crate::core::command::{
    build_plesk_db_command, build_plesk_login_command, build_subscription_exists_query,
    build_subscription_query, PLESK_LOGIN_REDIRECT,
};
use crate::domain::model::{Command, Host, SubscriptionInfo};
use crate::domain::ports::CommandExecutor;
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::{validate_domain, validate_linux_username};
use std::sync::Arc;

const PLESK_ROLE: &str = "Plesk servers";

/// Parses the output of the subscription query:
/// id, subscription name, `owner\tlogin`, then one domain per line.
pub fn parse_subscription_answer(host: &Host, stdout: &str) -> Option<SubscriptionInfo> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 3 {
        return None;
    }

    let (username, userlogin) = match lines[2].split_once('\t') {
        Some((name, login)) => (name.trim(), login.trim()),
        None => (lines[2], ""),
    };

    Some(SubscriptionInfo {
        host: host.clone(),
        id: lines[0].to_string(),
        name: lines[1].to_string(),
        username: username.to_string(),
        userlogin: userlogin.to_string(),
        domains: lines[3..].iter().map(|d| d.to_string()).collect(),
    })
}

pub struct PleskService<E: CommandExecutor> {
    executor: E,
    servers: Arc<[Host]>,
}

impl<E: CommandExecutor> PleskService<E> {
    pub fn new(executor: E, servers: Arc<[Host]>) -> Self {
        Self { executor, servers }
    }

    pub fn servers(&self) -> &[Host] {
        &self.servers
    }

    /// Subscriptions holding `raw_domain`, in configured server order.
    pub async fn lookup_subscription(&self, raw_domain: &str) -> Result<Vec<SubscriptionInfo>> {
        let domain = validate_domain(raw_domain)?;
        let command = build_plesk_db_command(&build_subscription_query(&domain));
        let results = self.executor.execute_on_hosts(&self.servers, &command).await;

        let mut reachable = 0;
        let mut subscriptions = Vec::new();
        for host in self.servers.iter() {
            if let Some(Ok(stdout)) = results.get(host).map(|result| &result.outcome) {
                reachable += 1;
                if let Some(info) = parse_subscription_answer(host, stdout) {
                    subscriptions.push(info);
                }
            }
        }

        if reachable == 0 {
            return Err(self.unreachable(&self.servers));
        }
        if subscriptions.is_empty() {
            return Err(OpsError::NotFound {
                what: format!("Subscription with domain [{}]", domain),
            });
        }
        Ok(subscriptions)
    }

    /// One-time login link for `ssh_username` that lands on the subscription's
    /// overview page.
    pub async fn login_link(&self, host: &Host, subscription_id: u64, ssh_username: &str) -> Result<String> {
        if !self.servers.contains(host) {
            return Err(OpsError::InvalidInput {
                field: "host".to_string(),
                reason: format!("'{}' is not a Plesk server", host),
            });
        }
        validate_linux_username("ssh_username", ssh_username)?;

        let exists = build_plesk_db_command(&build_subscription_exists_query(subscription_id));
        let name = self.run_on(host, &exists).await?;
        if name.trim().is_empty() {
            return Err(OpsError::NotFound {
                what: format!("Subscription with {} ID", subscription_id),
            });
        }

        let link = self.run_on(host, &build_plesk_login_command(ssh_username)).await?;
        Ok(format!("{}{}{}", link.trim(), PLESK_LOGIN_REDIRECT, subscription_id))
    }

    async fn run_on(&self, host: &Host, command: &Command) -> Result<String> {
        let targets = [host.clone()];
        let mut results = self.executor.execute_on_hosts(&targets, command).await;
        match results.remove(host).map(|result| result.outcome) {
            Some(Ok(stdout)) => Ok(stdout),
            _ => Err(self.unreachable(&targets)),
        }
    }

    fn unreachable(&self, hosts: &[Host]) -> OpsError {
        OpsError::NoHostsReachable {
            role: PLESK_ROLE.to_string(),
            hosts: hosts.to_vec(),
        }
    }
}
