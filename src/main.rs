use clap::Parser;
use fleet_dns_ops::config::{Commands, ZoneMasterCommands};
use fleet_dns_ops::domain::model::Host;
use fleet_dns_ops::domain::ports::ConfigProvider;
use fleet_dns_ops::utils::audit::{AuditLog, AuditRecord};
use fleet_dns_ops::utils::error::ErrorSeverity;
use fleet_dns_ops::utils::{logger, shutdown, validation::Validate};
use fleet_dns_ops::{
    CliArgs, FanOutExecutor, OpsError, PleskService, SshShell, TomlConfig, ZoneMasterService,
};
use std::path::PathBuf;

type Executor = FanOutExecutor<SshShell>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if args.json_logs || config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting {}", config.service_name());

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let executor = FanOutExecutor::new(SshShell::from_config(&config.ssh), config.command_timeout());
    let audit = AuditLog::new(config.audit_path().map(PathBuf::from));
    let principal = args.principal();
    tracing::debug!(
        "Name servers: {:?}, per-host timeout: {:?}",
        config.name_servers(),
        executor.per_host_timeout()
    );

    // Losing the race drops `run`, which aborts every ssh session in flight.
    let work = run(&args.command, &config, executor, &audit, &principal);
    let Some(result) = shutdown::until_interrupted(work, tokio::signal::ctrl_c()).await else {
        tracing::warn!("⚠️ Interrupted, remote sessions cancelled");
        anyhow::bail!("interrupted");
    };

    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?}, Status: {})",
                e,
                e.category(),
                e.severity(),
                e.status_code()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            println!(
                "{}",
                serde_json::json!({ "error": e.to_string(), "status": e.status_code() })
            );

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 1,      // bad input or not found
                ErrorSeverity::Medium => 2,   // fleet unreachable, retry
                ErrorSeverity::High => 1,     // configuration
                ErrorSeverity::Critical => 3, // local system
            };
            std::process::exit(exit_code);
        }
    }
}

async fn run(
    command: &Commands,
    config: &TomlConfig,
    executor: Executor,
    audit: &AuditLog,
    principal: &str,
) -> Result<serde_json::Value, OpsError> {
    match command {
        Commands::Zonemaster { action } => {
            let service = ZoneMasterService::new(executor, config.name_server_list());
            match action {
                ZoneMasterCommands::Get { domain } => {
                    let report = service.resolve(domain).await?;
                    for answer in report.answers.iter().filter(|a| a.is_failure()) {
                        if let Some(err) = answer.error() {
                            tracing::warn!(host = %answer.ns, "⚠️ Name server not queried: {}", err);
                        }
                    }
                    tracing::info!("✅ Zone master lookup for {} finished", report.domain);
                    record(audit, AuditRecord::zone_master_fetch(principal, &report));
                    Ok(serde_json::to_value(&report)?)
                }
                ZoneMasterCommands::Remove { domain } => {
                    let outcome = match service.remove(domain).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            // Some zones are already gone; the history must say so.
                            if let OpsError::PartialFailure {
                                domain,
                                failed,
                                succeeded,
                                previous,
                            } = &e
                            {
                                record(
                                    audit,
                                    AuditRecord::partial_zone_master_removal(
                                        principal,
                                        domain,
                                        previous,
                                        succeeded,
                                        failed,
                                        e.status_code(),
                                    ),
                                );
                            }
                            return Err(e);
                        }
                    };
                    tracing::info!(
                        "✅ Zone master of {} removed from {} host(s)",
                        outcome.domain,
                        outcome.removed_from.len()
                    );
                    record(audit, AuditRecord::zone_master_removal(principal, &outcome));
                    Ok(serde_json::json!({
                        "message": "Zone master deleted successfully",
                        "domain": outcome.domain,
                        "previous": outcome.previous,
                        "removed_from": outcome.removed_from,
                    }))
                }
            }
        }
        Commands::Subscription { domain } => {
            let service = plesk_service(config, executor)?;
            let subscriptions = service.lookup_subscription(domain).await?;
            tracing::info!("✅ Found {} subscription(s)", subscriptions.len());
            record(
                audit,
                AuditRecord::subscription_lookup(principal, &domain.to_ascii_lowercase(), subscriptions.len()),
            );
            Ok(serde_json::to_value(&subscriptions)?)
        }
        Commands::LoginLink {
            host,
            subscription_id,
            user,
        } => {
            let service = plesk_service(config, executor)?;
            let host = Host::new(host.as_str());
            let link = service.login_link(&host, *subscription_id, user).await?;
            record(audit, AuditRecord::login_link(principal, &host, *subscription_id));
            Ok(serde_json::json!({ "link": link }))
        }
    }
}

fn plesk_service(config: &TomlConfig, executor: Executor) -> Result<PleskService<Executor>, OpsError> {
    if config.plesk_servers().is_empty() {
        return Err(OpsError::MissingConfigError {
            field: "plesk.servers".to_string(),
        });
    }
    Ok(PleskService::new(executor, config.plesk_server_list()))
}

// Audit failures are logged, never returned.
fn record(audit: &AuditLog, entry: AuditRecord) {
    if let Err(e) = audit.record(&entry) {
        tracing::error!("❌ Failed to write audit record: {}", e);
    }
}
