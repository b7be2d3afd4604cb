mod app;
mod components;
mod config;
mod connection;
mod data;
mod events;
mod theme;
mod utils;
mod view;

use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::mpsc;
use tracing::info;

use crate::app::{App, AppOptions};
use crate::config::Config;
use crate::connection::{ConnectionManager, ConnectionRequest, ConnectionSession};
use crate::data::artifact::ContractArtifact;
use crate::data::provider::HttpProviderAccessor;
use crate::data::{VisualizationService, VisualizationSettings};
use crate::events::AppEvent;
use crate::view::ErrorRouter;

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "curve_view=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();
    init_logging(&config)?;

    let artifact = ContractArtifact::from_path(&config.artifact)
        .wrap_err_with(|| format!("cannot load artifact {}", config.artifact.display()))?;

    let rpc_url = config.resolve_rpc_url();
    match &rpc_url {
        Some(url) => info!(%url, chain = %config.chain, "using RPC endpoint"),
        None => info!(chain = %config.chain, "no RPC endpoint for chain"),
    }

    // Create event channels
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();

    let loaded_tx = event_tx.clone();
    let manager = ConnectionManager::new(
        Arc::new(HttpProviderAccessor::new(rpc_url)),
        config.probe_timeout(),
        conn_tx,
    )
    .with_on_loaded(Arc::new(move |request| {
        let _ = loaded_tx.send(AppEvent::ContractLoaded(request));
    }));

    let session = ConnectionSession::new(
        manager,
        ConnectionRequest {
            address: config.address.clone(),
            artifact: Arc::new(artifact),
        },
    );

    let router = if config.delegate_errors {
        let host_tx = event_tx.clone();
        ErrorRouter::delegating(Box::new(move |message: &str| {
            let _ = host_tx.send(AppEvent::HostError(message.to_string()));
        }))
    } else {
        ErrorRouter::internal()
    };

    info!(delegate_errors = router.is_delegating(), "error routing configured");

    let service = VisualizationService::new(
        VisualizationSettings {
            timeline_lookback: config.timeline_lookback,
            curve_function: config.curve_function.clone(),
            curve_max_supply: config.curve_max_supply,
            curve_samples: config.curve_samples,
            ..Default::default()
        },
        event_tx,
    );

    let mut app = App::new(
        session,
        conn_rx,
        service,
        event_rx,
        router,
        AppOptions::from(&config),
    );

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
