use crate::utils::error::HostExecutionError;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// A validated, lower-cased domain name. Only `validation::validate_domain`
/// constructs one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub(crate) fn new_validated(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name server or Plesk server identifier (hostname or IP) from the static
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Host(String);

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Host {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Host {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete shell command line for a remote host. Built only by the
/// functions in `core::command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command(String);

impl Command {
    pub(crate) fn new(line: String) -> Self {
        Self(line)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostExecutionResult {
    pub host: Host,
    pub outcome: std::result::Result<String, HostExecutionError>,
}

impl HostExecutionResult {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneMasterStatus {
    Found(Ipv4Addr),
    Absent,
    /// The host could not be queried, or answered with something unusable.
    Failed(HostExecutionError),
}

/// One name server's view of a domain's zone master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMasterAnswer {
    pub ns: Host,
    pub status: ZoneMasterStatus,
}

impl ZoneMasterAnswer {
    /// Interprets the raw output of the zone master lookup pipeline.
    pub fn from_outcome(ns: Host, outcome: std::result::Result<String, HostExecutionError>) -> Self {
        let status = match outcome {
            Err(err) => ZoneMasterStatus::Failed(err),
            Ok(stdout) => match stdout.split_whitespace().next() {
                None => ZoneMasterStatus::Absent,
                Some(token) => match token.trim_end_matches('.').parse::<Ipv4Addr>() {
                    Ok(ip) => ZoneMasterStatus::Found(ip),
                    Err(_) => ZoneMasterStatus::Failed(HostExecutionError::UnexpectedOutput(
                        token.to_string(),
                    )),
                },
            },
        };
        Self { ns, status }
    }

    pub fn zone_master(&self) -> Option<Ipv4Addr> {
        match self.status {
            ZoneMasterStatus::Found(ip) => Some(ip),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&HostExecutionError> {
        match &self.status {
            ZoneMasterStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }
}

// {"ns": .., "zone_master": "1.2.3.4" | null} plus "error" for failed hosts.
impl Serialize for ZoneMasterAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let error = self.error().map(ToString::to_string);
        let len = if error.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ZoneMasterAnswer", len)?;
        state.serialize_field("ns", &self.ns)?;
        state.serialize_field("zone_master", &self.zone_master())?;
        if let Some(error) = error {
            state.serialize_field("error", &error)?;
        }
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneMasterReport {
    pub domain: Domain,
    pub answers: Vec<ZoneMasterAnswer>,
}

impl ZoneMasterReport {
    pub fn zone_masters(&self) -> Vec<Ipv4Addr> {
        self.answers.iter().filter_map(ZoneMasterAnswer::zone_master).collect()
    }
}

/// Result of a zone master removal, carrying the prior state for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalOutcome {
    pub domain: Domain,
    pub previous: Vec<ZoneMasterAnswer>,
    pub removed_from: Vec<Host>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub host: Host,
    pub id: String,
    pub name: String,
    pub username: String,
    pub userlogin: String,
    pub domains: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_from_outcome() {
        let found = ZoneMasterAnswer::from_outcome(Host::from("ns1"), Ok("10.0.0.1\n".to_string()));
        assert_eq!(found.zone_master(), Some(Ipv4Addr::new(10, 0, 0, 1)));

        let absent = ZoneMasterAnswer::from_outcome(Host::from("ns2"), Ok("  \n".to_string()));
        assert_eq!(absent.status, ZoneMasterStatus::Absent);
        assert!(!absent.is_failure());

        let down = ZoneMasterAnswer::from_outcome(
            Host::from("ns3"),
            Err(HostExecutionError::Connection {
                stderr: "Connection refused".to_string(),
            }),
        );
        assert!(down.is_failure());
        assert_eq!(down.zone_master(), None);
    }

    #[test]
    fn test_answer_accepts_trailing_dot_from_grep() {
        let answer = ZoneMasterAnswer::from_outcome(Host::from("ns1"), Ok("192.0.2.53.\n".to_string()));
        assert_eq!(answer.zone_master(), Some(Ipv4Addr::new(192, 0, 2, 53)));
    }

    #[test]
    fn test_garbage_output_is_a_failure_not_absent() {
        let answer = ZoneMasterAnswer::from_outcome(Host::from("ns1"), Ok("permission denied".to_string()));
        assert!(answer.is_failure());
        assert_eq!(
            answer.status,
            ZoneMasterStatus::Failed(HostExecutionError::UnexpectedOutput("permission".to_string()))
        );
    }

    #[test]
    fn test_answer_serialization() {
        let found = ZoneMasterAnswer::from_outcome(Host::from("ns1"), Ok("10.0.0.1".to_string()));
        let absent = ZoneMasterAnswer::from_outcome(Host::from("ns2"), Ok(String::new()));
        let down = ZoneMasterAnswer::from_outcome(Host::from("ns3"), Err(HostExecutionError::Aborted));

        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            serde_json::json!({"ns": "ns1", "zone_master": "10.0.0.1"})
        );
        assert_eq!(
            serde_json::to_value(&absent).unwrap(),
            serde_json::json!({"ns": "ns2", "zone_master": null})
        );
        assert_eq!(
            serde_json::to_value(&down).unwrap(),
            serde_json::json!({"ns": "ns3", "zone_master": null, "error": "session aborted before completion"})
        );
    }
}
