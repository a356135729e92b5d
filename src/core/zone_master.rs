use crate::core::command::{build_removal_command, build_zone_master_command};
use crate::domain::model::{Domain, Host, RemovalOutcome, ZoneMasterAnswer, ZoneMasterReport};
use crate::domain::ports::CommandExecutor;
use crate::utils::error::{HostExecutionError, OpsError, Result};
use crate::utils::validation::validate_domain;
use std::collections::HashMap;
use std::sync::Arc;

/// Finds (and removes) a domain's zone master across the name server fleet.
pub struct ZoneMasterService<E: CommandExecutor> {
    executor: E,
    name_servers: Arc<[Host]>,
}

impl<E: CommandExecutor> ZoneMasterService<E> {
    pub fn new(executor: E, name_servers: Arc<[Host]>) -> Self {
        Self {
            executor,
            name_servers,
        }
    }

    pub fn name_servers(&self) -> &[Host] {
        &self.name_servers
    }

    pub async fn resolve(&self, raw_domain: &str) -> Result<ZoneMasterReport> {
        self.resolve_on(raw_domain, &self.name_servers).await
    }

    pub async fn resolve_on(&self, raw_domain: &str, hosts: &[Host]) -> Result<ZoneMasterReport> {
        let domain = validate_domain(raw_domain)?;
        let command = build_zone_master_command(&domain);
        let results = self.executor.execute_on_hosts(hosts, &command).await;

        // Configured order, not completion order.
        let answers: Vec<ZoneMasterAnswer> = hosts
            .iter()
            .map(|host| {
                let outcome = results
                    .get(host)
                    .map(|result| result.outcome.clone())
                    .unwrap_or(Err(HostExecutionError::Aborted));
                ZoneMasterAnswer::from_outcome(host.clone(), outcome)
            })
            .collect();

        if answers.iter().all(ZoneMasterAnswer::is_failure) {
            return Err(OpsError::NoNameserversReachable {
                domain: domain.to_string(),
                hosts: hosts.to_vec(),
            });
        }

        Ok(ZoneMasterReport { domain, answers })
    }

    pub async fn remove(&self, raw_domain: &str) -> Result<RemovalOutcome> {
        self.remove_on(raw_domain, &self.name_servers).await
    }

    /// Deletes the zone on every host that currently reports a zone master
    /// for it. A host that could not be queried is never treated as absent:
    /// it lands in `failed`, so the removal is only `Ok` when every name
    /// server is verified clean.
    pub async fn remove_on(&self, raw_domain: &str, hosts: &[Host]) -> Result<RemovalOutcome> {
        let report = self.resolve_on(raw_domain, hosts).await?;

        let targets: Vec<Host> = report
            .answers
            .iter()
            .filter(|answer| answer.zone_master().is_some())
            .map(|answer| answer.ns.clone())
            .collect();
        let unverified = report.answers.iter().any(ZoneMasterAnswer::is_failure);

        if targets.is_empty() && !unverified {
            return Err(not_found(&report.domain));
        }

        let results = if targets.is_empty() {
            HashMap::new()
        } else {
            let command = build_removal_command(&report.domain);
            self.executor.execute_on_hosts(&targets, &command).await
        };

        let mut removed_from = Vec::new();
        let mut failed = Vec::new();
        for answer in &report.answers {
            if answer.is_failure() {
                failed.push(answer.ns.clone());
            } else if answer.zone_master().is_some() {
                let removed = results
                    .get(&answer.ns)
                    .map(|result| !result.is_failure())
                    .unwrap_or(false);
                if removed {
                    removed_from.push(answer.ns.clone());
                } else {
                    failed.push(answer.ns.clone());
                }
            }
        }

        if removed_from.is_empty() {
            return Err(OpsError::RemovalFailed {
                domain: report.domain.to_string(),
                failed,
            });
        }

        if !failed.is_empty() {
            return Err(OpsError::PartialFailure {
                domain: report.domain.to_string(),
                failed,
                succeeded: removed_from,
                previous: report.answers,
            });
        }

        Ok(RemovalOutcome {
            domain: report.domain,
            previous: report.answers,
            removed_from,
        })
    }
}

fn not_found(domain: &Domain) -> OpsError {
    OpsError::NotFound {
        what: format!("Zone master for domain [{}]", domain),
    }
}
