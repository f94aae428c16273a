//! levdash - Position dashboard client, command-line entry point.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use levdash_cli::{AppConfig, Application, Command};

/// Client for the leveraged position platform
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via LEVDASH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Wallet address to connect as, overriding the configuration
    #[arg(short, long)]
    wallet: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Config comes first: it carries the default log filter
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(wallet) = args.wallet {
        config.wallet_address = Some(wallet);
    }

    levdash_telemetry::init_logging(&config.telemetry.log_level)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        api_base_url = %config.api_base_url,
        wallet_configured = config.wallet_address.is_some(),
        wallet_valid = config.has_valid_wallet(),
        "Configuration loaded"
    );

    let app = Application::new(config, args.json)?;
    let rendered = app.run(args.command).await?;

    if rendered.success {
        println!("{}", rendered.body);
    } else {
        eprintln!("{}", rendered.body);
    }

    if let Some(metrics) = app.metrics_report()? {
        eprintln!("{metrics}");
    }

    Ok(if rendered.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
