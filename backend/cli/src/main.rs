mod config;
mod keys_cmd;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use peerverify_gateway::{shutdown_signal, start_server, GatewayState};
use peerverify_logging::{init_logger, TracingDecisionLog};

use config::Config;

#[derive(Parser)]
#[command(name = "peerverify")]
#[command(about = "Allow or deny node keys based on the local mesh daemon's peer list")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the /verify webhook (default)
    Serve {
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query the mesh daemon once and print the known node keys
    Keys,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    let cli = Cli::parse();

    init_logger(&config.logger_config());

    match cli.command.unwrap_or(Commands::Serve { bind: None, port: None }) {
        Commands::Serve { bind, port } => {
            let config = Config {
                bind_address: bind.unwrap_or(config.bind_address),
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Keys => {
            let source = config.status_source()?;
            keys_cmd::run(&source).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let addr = config.listen_addr()?;
    let source = config.status_source()?;

    info!(
        addr = %addr,
        status_command = %config.status_command,
        status_timeout_secs = config.status_timeout_secs,
        "Starting peerverify"
    );

    let state = GatewayState::new(Arc::new(source), Arc::new(TracingDecisionLog));
    start_server(addr, state, shutdown_signal()).await
}
