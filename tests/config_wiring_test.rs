use fleet_dns_ops::core::command::build_zone_master_command;
use fleet_dns_ops::domain::model::Host;
use fleet_dns_ops::domain::ports::ConfigProvider;
use fleet_dns_ops::utils::validation::{validate_domain, Validate};
use fleet_dns_ops::{FanOutExecutor, SshShell, TomlConfig, ZoneMasterService};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_drives_ssh_and_fleet() {
    let file = write_config(
        r#"
[ssh]
user = "dnsops"
port = 2200
connect_timeout_seconds = 4
command_timeout_seconds = 20
options = ["StrictHostKeyChecking=yes"]

[dns]
name_servers = ["ns1.example.net", "ns2.example.net", "ns3.example.net"]
"#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    config.validate().unwrap();

    let shell = SshShell::from_config(&config.ssh);
    let command = build_zone_master_command(&validate_domain("example.com").unwrap());
    let args = shell.command_args(&Host::from("ns2.example.net"), &command);

    assert!(args.windows(2).any(|w| w == ["-o", "ConnectTimeout=4"]));
    assert!(args.windows(2).any(|w| w == ["-o", "StrictHostKeyChecking=yes"]));
    assert!(args.windows(2).any(|w| w == ["-p", "2200"]));
    assert!(args.windows(2).any(|w| w == ["-l", "dnsops"]));
    assert_eq!(args.last().map(String::as_str), Some(command.as_str()));

    let executor = FanOutExecutor::new(shell, config.command_timeout());
    assert_eq!(executor.per_host_timeout(), Duration::from_secs(20));

    let service = ZoneMasterService::new(executor, config.name_server_list());
    let order: Vec<&str> = service.name_servers().iter().map(Host::as_str).collect();
    assert_eq!(order, vec!["ns1.example.net", "ns2.example.net", "ns3.example.net"]);
}

#[test]
fn test_unsafe_ssh_option_is_rejected_before_any_session() {
    let file = write_config(
        r#"
[ssh]
options = ["-oProxyCommand=touch /tmp/pwned"]

[dns]
name_servers = ["ns1"]
"#,
    );

    let config = TomlConfig::from_file(file.path()).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_config_file_is_an_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = TomlConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.status_code(), 500);
}
