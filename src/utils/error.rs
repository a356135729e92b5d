use crate::domain::model::{Host, ZoneMasterAnswer};
use std::time::Duration;
use thiserror::Error;

/// Failure of one remote session. Recorded per host during a fan-out,
/// never raised across host boundaries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostExecutionError {
    #[error("failed to start remote session: {0}")]
    Spawn(String),

    #[error("connection or authentication failed: {stderr}")]
    Connection { stderr: String },

    #[error("remote command exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("remote command terminated by signal")]
    Terminated,

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("unexpected output: {0:?}")]
    UnexpectedOutput(String),

    #[error("session aborted before completion")]
    Aborted,
}

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Invalid domain {value:?}: {reason}")]
    InvalidDomain { value: String, reason: String },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("No name servers reachable for domain [{domain}]")]
    NoNameserversReachable { domain: String, hosts: Vec<Host> },

    #[error("No {role} reachable")]
    NoHostsReachable { role: String, hosts: Vec<Host> },

    #[error("{what} not found.")]
    NotFound { what: String },

    /// Some zones were deleted. `failed` also lists hosts that could not be
    /// queried, since they may still hold the zone.
    #[error("Zone master removal for [{domain}] incomplete on {} host(s)", failed.len())]
    PartialFailure {
        domain: String,
        failed: Vec<Host>,
        succeeded: Vec<Host>,
        previous: Vec<ZoneMasterAnswer>,
    },

    #[error("Zone master of [{domain}] could not be removed from any host")]
    RemovalFailed { domain: String, failed: Vec<Host> },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field}: {value:?} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    NotFound,
    Infrastructure,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl OpsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            OpsError::InvalidDomain { .. } | OpsError::InvalidInput { .. } => ErrorCategory::Input,
            OpsError::NotFound { .. } => ErrorCategory::NotFound,
            OpsError::NoNameserversReachable { .. }
            | OpsError::NoHostsReachable { .. }
            | OpsError::PartialFailure { .. }
            | OpsError::RemovalFailed { .. } => ErrorCategory::Infrastructure,
            OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. }
            | OpsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            OpsError::IoError(_) | OpsError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::NotFound => ErrorSeverity::Low,
            ErrorCategory::Infrastructure => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// HTTP-equivalent status for the boundary layer.
    pub fn status_code(&self) -> u16 {
        match self {
            OpsError::InvalidDomain { .. } | OpsError::InvalidInput { .. } => 422,
            OpsError::NotFound { .. } => 404,
            OpsError::NoNameserversReachable { .. } | OpsError::NoHostsReachable { .. } => 503,
            OpsError::PartialFailure { .. } | OpsError::RemovalFailed { .. } => 502,
            _ => 500,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Infrastructure
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            OpsError::InvalidDomain { .. } => {
                "Use a plain domain name such as example.com (letters, digits, dots and hyphens only)".to_string()
            }
            OpsError::InvalidInput { field, .. } => format!("Check the value passed for {}", field),
            OpsError::NotFound { .. } => "Verify the name is spelled correctly and is hosted on this fleet".to_string(),
            OpsError::NoNameserversReachable { hosts, .. } | OpsError::NoHostsReachable { hosts, .. } => format!(
                "Check SSH connectivity and credentials for: {}",
                join_hosts(hosts)
            ),
            OpsError::PartialFailure { failed, .. } | OpsError::RemovalFailed { failed, .. } => {
                format!("Retry the removal on: {}", join_hosts(failed))
            }
            OpsError::ConfigValidationError { .. }
            | OpsError::InvalidConfigValueError { .. }
            | OpsError::MissingConfigError { .. } => "Fix the configuration file and try again".to_string(),
            OpsError::IoError(_) => "Check file permissions and available disk space".to_string(),
            OpsError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            OpsError::NoNameserversReachable { domain, .. } => format!(
                "None of the name servers could be queried for {} (this is not the same as 'not found')",
                domain
            ),
            OpsError::PartialFailure {
                domain,
                failed,
                succeeded,
                ..
            } => format!(
                "Zone master for {} removed on {} but NOT on {}",
                domain,
                join_hosts(succeeded),
                join_hosts(failed)
            ),
            other => other.to_string(),
        }
    }
}

fn join_hosts(hosts: &[Host]) -> String {
    hosts
        .iter()
        .map(Host::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, OpsError>;
