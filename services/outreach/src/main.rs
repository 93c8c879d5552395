//! Outreach CLI
//!
//! Command-line interface for the outreach website and mail service.

use std::path::PathBuf;

use clap::Parser;
use outreach::{load_config, run, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "outreach")]
#[command(about = "Outreach website, dashboards and mail relay")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP port (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Prompt for a password, print its argon2 hash for the accounts list and exit
    #[arg(long)]
    hash_password: bool,
}

fn print_password_hash() -> Result<(), Box<dyn std::error::Error>> {
    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        return Err("passwords do not match".into());
    }
    println!("{}", outreach_auth::credentials::hash_password(&password)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.hash_password {
        return print_password_hash();
    }

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, port={:?}, log_level={:?}",
        args.config,
        args.port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.resolve_secrets()?;

    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Starting outreach service");
    tracing::debug!(
        "Accounts: {}, batch size: {}, pacing: {:?}",
        config.accounts.len(),
        config.newsletter.batch_size,
        config.newsletter.pacing
    );

    run(config).await?;

    Ok(())
}
