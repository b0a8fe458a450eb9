use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use dockwarden::cli::Cli;
use dockwarden::config::WardenConfig;
use dockwarden::engine::DockerEngine;
use dockwarden::notifier::Notifier;
use dockwarden::state::WardenState;
use dockwarden::supervisor::Supervisor;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match WardenConfig::load(cli.config_file.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    tracing::info!(mode = ?config.mode, socket = %config.docker_socket, "starting dockwarden");

    let engine = match DockerEngine::new(&config.docker_socket) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to the container engine");
            return ExitCode::FAILURE;
        }
    };

    let notifier = Notifier::new(config.notification_url.clone());
    let state = Arc::new(WardenState::new(Arc::new(engine), config));

    match Supervisor::new(state, notifier).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "dockwarden exited with an error");
            ExitCode::FAILURE
        }
    }
}
