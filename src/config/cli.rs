use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "fleet-dns-ops")]
#[command(about = "Zone master and Plesk subscription lookups across the DNS fleet")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "fleet-dns-ops.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Who is acting, recorded in the audit log (defaults to $USER)
    #[arg(long)]
    pub principal: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Zone master lookups and removal on the name servers
    Zonemaster {
        #[command(subcommand)]
        action: ZoneMasterCommands,
    },

    /// Find the Plesk subscription that holds a domain
    Subscription { domain: String },

    /// Generate a Plesk login link for a subscription
    LoginLink {
        #[arg(long)]
        host: String,

        #[arg(long)]
        subscription_id: u64,

        #[arg(long)]
        user: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ZoneMasterCommands {
    /// Show the zone master each name server has for the domain
    Get { domain: String },

    /// Delete the domain's zone on every name server that has it
    Remove { domain: String },
}

impl CliArgs {
    pub fn principal(&self) -> String {
        self.principal
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
