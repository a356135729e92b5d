use crate::domain::model::{Host, RemovalOutcome, ZoneMasterAnswer, ZoneMasterReport};
use crate::utils::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const DNS_SERVERS: &str = "dns_servers";

/// One line of the action history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub principal: String,
    pub action: String,
    pub server: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub status: u16,
}

impl AuditRecord {
    fn new(principal: &str, action: String, server: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            principal: principal.to_string(),
            action,
            server: server.to_string(),
            before: None,
            after: None,
            status: 200,
        }
    }

    pub fn zone_master_fetch(principal: &str, report: &ZoneMasterReport) -> Self {
        Self::new(
            principal,
            format!("get zonemaster of domain [{}]", report.domain),
            DNS_SERVERS,
        )
    }

    /// `before` lists the zone masters that existed, `after` is always none.
    pub fn zone_master_removal(principal: &str, outcome: &RemovalOutcome) -> Self {
        let before = previous_zone_masters(&outcome.previous);
        let mut record = Self::new(
            principal,
            format!(
                "remove dns zone master of [{}] [{}->None]",
                outcome.domain, before
            ),
            DNS_SERVERS,
        );
        record.before = Some(before);
        record.after = Some("None".to_string());
        record
    }

    /// Removal that changed some hosts but not all. Written with the error's
    /// status so the history still shows what was deleted.
    pub fn partial_zone_master_removal(
        principal: &str,
        domain: &str,
        previous: &[ZoneMasterAnswer],
        succeeded: &[Host],
        failed: &[Host],
        status: u16,
    ) -> Self {
        let before = previous_zone_masters(previous);
        let mut record = Self::new(
            principal,
            format!(
                "remove dns zone master of [{}] [{}->None] (incomplete)",
                domain, before
            ),
            DNS_SERVERS,
        );
        record.before = Some(before);
        record.after = Some(format!(
            "None on {}; unchanged on {}",
            join_hosts(succeeded),
            join_hosts(failed)
        ));
        record.status = status;
        record
    }

    pub fn subscription_lookup(principal: &str, domain: &str, found: usize) -> Self {
        let mut record = Self::new(
            principal,
            format!("get subscription info of domain [{}]", domain),
            "plesk_servers",
        );
        record.after = Some(format!("{} subscription(s)", found));
        record
    }

    pub fn login_link(principal: &str, host: &Host, subscription_id: u64) -> Self {
        Self::new(
            principal,
            format!("generate login link for subscription [{}]", subscription_id),
            host.as_str(),
        )
    }

    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn previous_zone_masters(previous: &[ZoneMasterAnswer]) -> String {
    let found: Vec<String> = previous
        .iter()
        .filter_map(ZoneMasterAnswer::zone_master)
        .map(|ip| ip.to_string())
        .collect();
    if found.is_empty() {
        "None".to_string()
    } else {
        found.join(", ")
    }
}

fn join_hosts(hosts: &[Host]) -> String {
    hosts.iter().map(Host::as_str).collect::<Vec<_>>().join(", ")
}

/// Appends records as JSON lines to an optional file and always emits them
/// on the `audit` tracing target.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn record(&self, record: &AuditRecord) -> Result<()> {
        let line = record.to_json_line()?;
        tracing::info!(target: "audit", "{}", line);

        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
