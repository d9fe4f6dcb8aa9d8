use clap::Parser;
use std::process::ExitCode;
use switchboard_protocol::{PeerInfo, ProviderServer};
use switchboard_tools::{Toolset, ToolsetSettings};

#[derive(Parser, Debug)]
#[command(name = "switchboard-provider", version)]
#[command(about = "Serve one standard toolset over stdin/stdout")]
struct Cli {
    /// Toolset to serve: math, units, currency, weather, websearch or wikipedia
    toolset: Toolset,
}

#[tokio::main]
async fn main() -> ExitCode {
    switchboard_cli::init_tracing("info");
    let cli = Cli::parse();

    let registry = match cli.toolset.registry(&ToolsetSettings::from_env()) {
        Ok(registry) => registry,
        Err(err) => {
            tracing::error!(toolset = %cli.toolset, error = %err, "failed to build toolset");
            return ExitCode::FAILURE;
        }
    };

    let server = ProviderServer::new(PeerInfo::new(cli.toolset.name()), registry);
    match server.serve_stdio().await {
        Ok(()) => {
            tracing::info!(toolset = %cli.toolset, "input closed, exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(toolset = %cli.toolset, error = %err, "provider failed");
            ExitCode::FAILURE
        }
    }
}
