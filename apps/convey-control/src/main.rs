use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::get;
use clap::Parser;
use convey_control::{
    build_router,
    cli::{Cli, ServerConfig},
    config::NotificationConfig,
    executor::StatusBoard,
    longpoll::StatusSignal,
    telemetry::Telemetry,
    AppState,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use watch_bus::CommandReceiver;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = Telemetry::init()?;

    let config = ServerConfig::try_from(Cli::parse())?;
    info!(
        listen_addr = %config.listen_addr,
        root = %config.root.display(),
        notify_config = %config.notify_config.display(),
        "starting convey-control"
    );

    run(config, telemetry.metrics_handle()).await
}

async fn run(config: ServerConfig, metrics: PrometheusHandle) -> Result<()> {
    let notifications = NotificationConfig::load(&config.notify_config)
        .context("failed to load notification config")?;
    let status = notifications.config_status();
    info!(
        sound = status.sound_configured,
        push = status.push_configured,
        "notification channels"
    );

    let (bridge, commands) = watch_bus::channel();
    let signal = StatusSignal::new();
    let board = Arc::new(StatusBoard::new(signal.clone(), "idle"));
    let state = AppState::new(config.root.clone(), bridge, board, signal, notifications);
    let watcher_handle = tokio::spawn(log_commands(commands));

    let router = build_router(state)
        .route("/healthz", get(health_check))
        .route("/metrics", get(move || std::future::ready(metrics.render())))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .context("failed to bind listener")?;
    info!("convey-control listening on {}", config.listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server shutdown with error")?;

    info!(
        grace_seconds = config.shutdown_grace.as_secs(),
        "shutdown signal received; sleeping for graceful period"
    );
    watcher_handle.abort();
    tokio::time::sleep(config.shutdown_grace).await;
    info!("graceful shutdown complete");
    Ok(())
}

/// Stand-in for an embedded watcher: accepts commands and records them.
async fn log_commands(mut commands: CommandReceiver) {
    while let Some(command) = commands.recv().await {
        info!(
            instruction = command.instruction().as_str(),
            details = %command.details(),
            "watcher received command"
        );
    }
}

async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
