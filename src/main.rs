//! Main entry point for DeepL Proxy

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepl_proxy::cli::commands::{self, Commands};
use deepl_proxy::ServerConfig;

/// DeepL Proxy - HTTP front for the DeepL translation API
#[derive(Parser, Debug)]
#[command(name = "deepl-proxy", version, about, long_about = None)]
struct Args {
    /// DeepL auth key (optional, defaults to DEEPL_AUTH_KEY env var)
    #[arg(long)]
    auth_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("deepl_proxy={0},tower_http={0}", log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Execute command
    match args.command.unwrap_or_default() {
        Commands::Serve { host, port } => {
            let config = commands::apply_overrides(config, args.auth_key, host, port);
            commands::handle_serve(config).await?;
        }
    }

    Ok(())
}
