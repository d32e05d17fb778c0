use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Process-wide logging and metrics, installed once from `main`.
pub struct Telemetry {
    metrics_handle: PrometheusHandle,
}

impl Telemetry {
    pub fn init() -> Result<Self> {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
            .context("failed to initialise tracing subscriber")?;

        let metrics_handle = PrometheusBuilder::new()
            .install_recorder()
            .context("failed to install Prometheus metrics recorder")?;

        Ok(Self { metrics_handle })
    }

    pub fn metrics_handle(&self) -> PrometheusHandle {
        self.metrics_handle.clone()
    }
}
