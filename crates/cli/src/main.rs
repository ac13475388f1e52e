//! CloudSim CLI - Main Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudsim_common::{DomainKind, Inventory, SimulatorConfig};
use std::path::PathBuf;
use tracing::debug;

use cloudsim_cli::commands::resource::{self, ResourceCommands};
use cloudsim_cli::commands::{demo, inventory, summary, vm};
use cloudsim_cli::output::{self, print_error};

/// CloudSim CLI - Simulated Cloud Console
#[derive(Parser)]
#[command(name = "cloudsim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "CLOUDSIM_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Divide every lifecycle delay by this factor
    #[arg(long, global = true)]
    speedup: Option<f64>,

    /// Start with empty stores
    #[arg(long, global = true)]
    no_seed: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the whole inventory
    Inventory {
        /// Only this domain (vm, db, storage, disk, vnet, nsg, lb, pip)
        #[arg(long)]
        domain: Option<DomainKind>,
    },

    /// Manage virtual machines
    #[command(subcommand)]
    Vm(vm::VmCommands),

    /// Manage database servers
    #[command(subcommand, alias = "db")]
    Database(ResourceCommands),

    /// Manage storage accounts
    #[command(subcommand)]
    Storage(ResourceCommands),

    /// Manage managed disks
    #[command(subcommand)]
    Disk(ResourceCommands),

    /// Manage virtual networks
    #[command(subcommand)]
    Vnet(ResourceCommands),

    /// Manage network security groups
    #[command(subcommand)]
    Nsg(ResourceCommands),

    /// Manage load balancers
    #[command(subcommand)]
    Lb(ResourceCommands),

    /// Manage public IP addresses
    #[command(subcommand)]
    Pip(ResourceCommands),

    /// Provision one resource per domain and watch the lifecycle
    Demo,

    /// Resource counts per domain and status
    Summary,

    /// Show version information
    Version,
}

fn load_config(cli: &Cli) -> Result<SimulatorConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(cloudsim_common::default_config_path);
    let mut config = SimulatorConfig::load(&path)?;

    if let Some(speedup) = cli.speedup {
        config.lifecycle.speedup = speedup;
    }
    if cli.no_seed {
        config.seed = false;
    }
    debug!("Configuration: {:?}", config);
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        println!("cloudsim {}", cloudsim_common::VERSION);
        return Ok(());
    }

    let inventory = Inventory::new(load_config(&cli)?)?;
    let format = cli.format;

    match cli.command {
        Commands::Inventory { domain } => inventory::execute(&inventory, domain, format)?,
        Commands::Vm(cmd) => vm::execute(cmd, &inventory, format).await?,
        Commands::Database(cmd) => resource::execute(cmd, &inventory.databases, format).await?,
        Commands::Storage(cmd) => resource::execute(cmd, &inventory.storage_accounts, format).await?,
        Commands::Disk(cmd) => resource::execute(cmd, &inventory.disks, format).await?,
        Commands::Vnet(cmd) => resource::execute(cmd, &inventory.virtual_networks, format).await?,
        Commands::Nsg(cmd) => resource::execute(cmd, &inventory.network_security_groups, format).await?,
        Commands::Lb(cmd) => resource::execute(cmd, &inventory.load_balancers, format).await?,
        Commands::Pip(cmd) => resource::execute(cmd, &inventory.public_ips, format).await?,
        Commands::Demo => demo::execute(&inventory, format).await?,
        Commands::Summary => summary::execute(&inventory, format)?,
        Commands::Version => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
