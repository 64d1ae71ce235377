mod app;
mod config;
mod handlers;
mod models;
mod payload;
mod service;
mod state;
mod store;

use animal_common::{bind_listener, init_tracing, shutdown_signal};
use std::process::ExitCode;

use crate::config::ServiceConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let _guards = init_tracing("animal-data-service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        animal_data_path = %config.animal_data_path,
        latest_animal_path = %config.latest_animal_path,
        max_history = config.max_history,
        "starting animal data service"
    );

    // Both endpoints live in memory only; a restart clears them.
    let state = AppState::new(&config);
    let app = app::build_router(&config, state);

    let listener = match bind_listener(config.host, config.port).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, port = config.port, "bind listener failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
