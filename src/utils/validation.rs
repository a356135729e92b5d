use crate::domain::model::{Domain, Host};
use crate::utils::error::{OpsError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

pub const MIN_DOMAIN_LENGTH: usize = 3;
pub const MAX_DOMAIN_LENGTH: usize = 63;

static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z0-9]([a-zA-Z0-9\-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$")
        .expect("domain pattern compiles")
});

static LINUX_USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_]([a-z0-9_-]{0,31}|[a-z0-9_-]{0,30}\$)$").expect("username pattern compiles")
});

static HOST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._:-]{0,252}$").expect("host pattern compiles"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid_domain(raw: &str, reason: impl Into<String>) -> OpsError {
    OpsError::InvalidDomain {
        value: raw.to_string(),
        reason: reason.into(),
    }
}

/// The only way to obtain a [`Domain`]. Any character outside
/// `[a-zA-Z0-9.-]` is rejected before anything else is looked at.
pub fn validate_domain(raw: &str) -> Result<Domain> {
    if raw.is_empty() {
        return Err(invalid_domain(raw, "domain cannot be empty"));
    }

    if let Some(c) = raw
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(invalid_domain(
            raw,
            format!("forbidden character '{}'", c.escape_debug()),
        ));
    }

    if raw.len() < MIN_DOMAIN_LENGTH || raw.len() > MAX_DOMAIN_LENGTH {
        return Err(invalid_domain(
            raw,
            format!(
                "length must be between {} and {} characters",
                MIN_DOMAIN_LENGTH, MAX_DOMAIN_LENGTH
            ),
        ));
    }

    if raw.contains("..") {
        return Err(invalid_domain(raw, "consecutive dots"));
    }

    let labels: Vec<&str> = raw.split('.').collect();
    for label in &labels {
        if label.is_empty() {
            continue;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid_domain(
                raw,
                format!("label '{}' starts or ends with a hyphen", label),
            ));
        }
    }

    match labels.last() {
        Some(last) if last.len() >= 2 => {}
        _ => return Err(invalid_domain(raw, "final label must be at least 2 characters")),
    }

    if !DOMAIN_PATTERN.is_match(raw) {
        return Err(invalid_domain(raw, "not a valid domain name"));
    }

    Ok(Domain::new_validated(raw.to_ascii_lowercase()))
}

pub fn validate_linux_username(field_name: &str, username: &str) -> Result<()> {
    if !LINUX_USERNAME_PATTERN.is_match(username) {
        return Err(OpsError::InvalidInput {
            field: field_name.to_string(),
            reason: "should be a valid Linux username".to_string(),
        });
    }
    Ok(())
}

pub fn validate_hosts(field_name: &str, hosts: &[Host]) -> Result<()> {
    let mut seen = HashSet::new();
    for host in hosts {
        if !HOST_PATTERN.is_match(host.as_str()) {
            return Err(OpsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: host.to_string(),
                reason: "not a valid hostname or IP address".to_string(),
            });
        }
        if !seen.insert(host) {
            return Err(OpsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: host.to_string(),
                reason: "listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// `Key=Value` with no whitespace, as passed to `ssh -o`.
pub fn validate_ssh_option(field_name: &str, option: &str) -> Result<()> {
    let well_formed = option
        .split_once('=')
        .map(|(key, value)| !key.is_empty() && !value.is_empty())
        .unwrap_or(false);

    if !well_formed || option.chars().any(char::is_whitespace) || option.starts_with('-') {
        return Err(OpsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: option.to_string(),
            reason: "expected Key=Value without whitespace".to_string(),
        });
    }
    Ok(())
}
