use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::config::NotificationConfig;

/// How a single push attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Push is not configured; nothing was sent.
    Skipped,
    Delivered,
    /// The push service answered with a non-success status.
    Rejected,
    /// Connection error or the per-request timeout elapsed.
    Failed,
}

/// Best-effort push delivery to an ntfy-style topic endpoint.
///
/// Delivery problems are logged and counted, never raised as errors: a lost
/// notification must not hold up whoever reported the run.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn send(&self, config: &NotificationConfig, title: &str, body: &str) -> Delivery {
        if !config.push_enabled() {
            debug!("push notifications not configured; skipping");
            return Delivery::Skipped;
        }

        let url = format!("{}/{}", config.ntfy.server, config.ntfy.topic);
        let mut request = self
            .http
            .post(&url)
            .header("Title", title)
            .body(body.to_owned());
        if !config.ntfy.auth_header.is_empty() {
            request = request.header("Authorization", config.ntfy.auth_header.as_str());
        }
        if config.ntfy.timeout > 0 {
            request = request.timeout(Duration::from_secs(config.ntfy.timeout));
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                counter!("notifications_total", 1, "outcome" => "delivered");
                debug!(%url, "push notification delivered");
                Delivery::Delivered
            }
            Ok(response) => {
                counter!("notifications_total", 1, "outcome" => "rejected");
                warn!(%url, status = %response.status(), "push notification rejected");
                Delivery::Rejected
            }
            Err(err) => {
                counter!("notifications_total", 1, "outcome" => "failed");
                warn!(%url, error = %err, "push notification failed");
                Delivery::Failed
            }
        }
    }
}
