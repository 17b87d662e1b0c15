use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use device_sync::bridge::Bridge;
use device_sync::config;
use device_sync::registry::StaticRegistry;
use device_sync::sync::{SweepOptions, SyncOutcome};
use device_sync::ticket::TicketAction;
use rt_gateway::RtClient;
use shared_utils::env::get_env_var;

/// Environment variable holding the service API token.
const TOKEN_ENV: &str = "RT_TOKEN";

#[derive(Parser)]
#[command(version, about = "Device inventory / ticketing bridge")]
struct Cli {
    /// Path to the bridge settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: String,

    /// Path to the device inventory file (TOML)
    #[arg(short, long, value_name = "FILE")]
    inventory: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Probe connectivity and credentials
    Check,
    /// Reconcile the inventory into the remote asset catalog
    Sync {
        /// Sync a single device instead of the full inventory
        #[arg(long)]
        device: Option<String>,
        /// Skip orphaned-asset cleanup after a full sweep
        #[arg(long)]
        no_cleanup: bool,
    },
    /// File (or append to) a ticket for a device
    Ticket {
        #[arg(long)]
        device: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        text: String,
    },
    /// Retire the asset of a device removed from the inventory
    MarkRemoved {
        #[arg(long)]
        device: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let settings = config::load_settings_path(&cli.config)?;
    let token = SecretString::from(get_env_var(TOKEN_ENV)?);
    let gateway = RtClient::new(&settings.base_url, token)
        .context("failed to build service client")?;

    let registry = match &cli.inventory {
        Some(path) => config::load_inventory_path(path)?.into_registry(),
        None => StaticRegistry::default(),
    };

    let bridge = Bridge::new(gateway, registry, settings);

    match cli.cmd {
        Cmd::Check => {
            bridge.probe().await?;
            println!("ok");
        }
        Cmd::Sync { device, no_cleanup } => match device {
            Some(device_id) => {
                let outcome = bridge.sync_device(&device_id).await;
                println!("{}: {}", device_id, outcome_label(outcome));
            }
            None => {
                let options = SweepOptions {
                    cleanup: !no_cleanup,
                };
                let report = bridge.sync_all(&options).await;
                println!(
                    "synced {}, failed {}, skipped {}, deleted {}",
                    report.synced, report.failed, report.skipped, report.deleted
                );
            }
        },
        Cmd::Ticket {
            device,
            subject,
            text,
        } => {
            let filed = bridge.file_ticket(&device, &subject, &text).await?;
            let action = match filed.action {
                TicketAction::Created => "created",
                TicketAction::Commented => "commented",
            };
            println!("{} ticket {}: {}", action, filed.ticket_id, filed.ticket_url);
        }
        Cmd::MarkRemoved { device } => {
            let retired = bridge.mark_removed(&device).await;
            println!("{}", if retired { "deleted" } else { "no asset found" });
        }
    }

    Ok(())
}

fn outcome_label(outcome: SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::Synced => "synced",
        SyncOutcome::Failed => "failed",
        SyncOutcome::Skipped => "skipped",
    }
}
