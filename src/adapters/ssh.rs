use crate::config::toml_config::SshConfig;
use crate::domain::model::{Command, Host};
use crate::domain::ports::RemoteShell;
use crate::utils::error::HostExecutionError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

/// Exit status the OpenSSH client uses for its own failures
/// (connection refused, host key mismatch, authentication).
const SSH_CLIENT_FAILURE: i32 = 255;

/// Runs commands through the system `ssh` client, non-interactively.
#[derive(Debug, Clone)]
pub struct SshShell {
    binary: String,
    user: Option<String>,
    port: Option<u16>,
    identity_file: Option<PathBuf>,
    connect_timeout: Duration,
    options: Vec<String>,
}

impl SshShell {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            user: None,
            port: None,
            identity_file: None,
            connect_timeout: Duration::from_secs(5),
            options: Vec::new(),
        }
    }

    pub fn from_config(config: &SshConfig) -> Self {
        let mut shell = Self::new(config.binary());
        shell.user = config.user.clone();
        shell.port = config.port;
        shell.identity_file = config.identity_file.as_ref().map(PathBuf::from);
        shell.connect_timeout = config.connect_timeout();
        shell.options = config.options.clone().unwrap_or_default();
        shell
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Arguments passed to the ssh client. The remote command is always the
    /// final, single argument.
    pub fn command_args(&self, host: &Host, command: &Command) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
        ];
        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        if let Some(user) = &self.user {
            args.push("-l".to_string());
            args.push(user.clone());
        }
        args.push(host.to_string());
        args.push(command.to_string());
        args
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, host: &Host, command: &Command) -> Result<String, HostExecutionError> {
        tracing::debug!(host = %host, "opening ssh session");

        let output = tokio::process::Command::new(&self.binary)
            .args(self.command_args(host, command))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| HostExecutionError::Spawn(e.to_string()))?;

        let result = classify_output(output.status.code(), &output.stdout, &output.stderr);
        match &result {
            Ok(_) => tracing::debug!(host = %host, "ssh session finished"),
            Err(e) => tracing::debug!(host = %host, error = %e, "ssh session failed"),
        }
        result
    }
}

pub(crate) fn classify_output(
    code: Option<i32>,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<String, HostExecutionError> {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    match code {
        Some(0) => Ok(String::from_utf8_lossy(stdout).into_owned()),
        Some(SSH_CLIENT_FAILURE) => Err(HostExecutionError::Connection { stderr }),
        Some(code) => Err(HostExecutionError::NonZeroExit { code, stderr }),
        None => Err(HostExecutionError::Terminated),
    }
}
