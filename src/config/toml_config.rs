use crate::domain::model::Host;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_SSH_BINARY: &str = "ssh";
const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 5;
const DEFAULT_COMMAND_TIMEOUT_SECONDS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub service: Option<ServiceConfig>,
    #[serde(default)]
    pub ssh: SshConfig,
    pub dns: DnsConfig,
    pub plesk: Option<PleskConfig>,
    pub audit: Option<AuditConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SshConfig {
    pub binary: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_file: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
    pub command_timeout_seconds: Option<u64>,
    pub options: Option<Vec<String>>,
}

impl SshConfig {
    pub fn binary(&self) -> &str {
        self.binary.as_deref().unwrap_or(DEFAULT_SSH_BINARY)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_seconds
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS),
        )
    }

    /// Upper bound for one host's whole session, connection included.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(
            self.command_timeout_seconds
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECONDS),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    pub name_servers: Vec<Host>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PleskConfig {
    pub servers: Vec<Host>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OpsError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| OpsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        use once_cell::sync::Lazy;
        use regex::Regex;
        static ENV_VAR: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern compiles"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.dns.name_servers.is_empty() {
            return Err(OpsError::MissingConfigError {
                field: "dns.name_servers".to_string(),
            });
        }
        validation::validate_hosts("dns.name_servers", &self.dns.name_servers)?;

        if let Some(plesk) = &self.plesk {
            validation::validate_hosts("plesk.servers", &plesk.servers)?;
        }

        if let Some(binary) = &self.ssh.binary {
            validation::validate_non_empty_string("ssh.binary", binary)?;
        }
        if let Some(user) = &self.ssh.user {
            validation::validate_linux_username("ssh.user", user)?;
        }
        if let Some(port) = self.ssh.port {
            validation::validate_positive_number("ssh.port", u64::from(port), 1)?;
        }
        if let Some(identity) = &self.ssh.identity_file {
            validation::validate_path("ssh.identity_file", identity)?;
        }
        validation::validate_positive_number(
            "ssh.connect_timeout_seconds",
            self.ssh.connect_timeout().as_secs(),
            1,
        )?;
        validation::validate_positive_number(
            "ssh.command_timeout_seconds",
            self.ssh.command_timeout().as_secs(),
            1,
        )?;
        for option in self.ssh.options.iter().flatten() {
            validation::validate_ssh_option("ssh.options", option)?;
        }

        if let Some(audit) = &self.audit {
            validation::validate_path("audit.path", &audit.path)?;
        }

        Ok(())
    }

    pub fn service_name(&self) -> &str {
        self.service
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(env!("CARGO_PKG_NAME"))
    }

    pub fn name_server_list(&self) -> Arc<[Host]> {
        Arc::from(self.dns.name_servers.clone())
    }

    pub fn plesk_server_list(&self) -> Arc<[Host]> {
        Arc::from(self.plesk_servers().to_vec())
    }

    pub fn audit_path(&self) -> Option<&str> {
        self.audit.as_ref().map(|a| a.path.as_str())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn name_servers(&self) -> &[Host] {
        &self.dns.name_servers
    }

    fn plesk_servers(&self) -> &[Host] {
        self.plesk.as_ref().map(|p| p.servers.as_slice()).unwrap_or(&[])
    }

    fn command_timeout(&self) -> Duration {
        self.ssh.command_timeout()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
