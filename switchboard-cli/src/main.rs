use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use switchboard_agent::{
    AgentResult, AzureOpenAiEngine, CapabilityRegistry, Dispatcher, OperationProvider,
    Orchestrator, ProviderHandle, SwitchboardConfig, shutdown_all, spawn_all,
};
use tokio::io::BufReader;

#[derive(Parser, Debug)]
#[command(name = "switchboard", version)]
#[command(about = "Answer questions with a reasoning engine and a fleet of tool providers")]
#[command(
    long_about = "Reads queries from stdin until EOF or Ctrl+C.\n\n\
                  Configuration comes from the TOML file named by SWITCHBOARD_CONFIG \
                  (default: ./switchboard.toml) and the AZURE_OPENAI_* environment variables."
)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    switchboard_cli::init_tracing("warn");
    let _cli = Cli::parse();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, code = err.error_code(), "switchboard failed");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AgentResult<()> {
    let config = SwitchboardConfig::load()?;
    let engine = AzureOpenAiEngine::from_config(&config.engine)?;

    let handles: Vec<Arc<ProviderHandle>> = spawn_all(&config.providers, &config.transport)
        .await?
        .into_iter()
        .map(Arc::new)
        .collect();
    let providers: Vec<Arc<dyn OperationProvider>> = handles
        .iter()
        .map(|handle| handle.clone() as Arc<dyn OperationProvider>)
        .collect();

    let registry = match CapabilityRegistry::register(providers) {
        Ok(registry) => registry,
        Err(err) => {
            shutdown_all(handles.iter().map(|handle| handle.as_ref())).await;
            return Err(err.into());
        }
    };
    tracing::info!(
        providers = handles.len(),
        operations = registry.len(),
        "capabilities registered"
    );

    let dispatcher = Dispatcher::new(Arc::new(registry));
    let mut orchestrator = Orchestrator::new(Arc::new(engine), Arc::new(dispatcher));

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };
    let result = orchestrator
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown)
        .await;

    shutdown_all(handles.iter().map(|handle| handle.as_ref())).await;
    result
}
