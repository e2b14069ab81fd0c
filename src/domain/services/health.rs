#[cfg(test)]
#[path = "health_test.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::infrastructure::api::ApiClient;

/// Polls the backend health endpoint on a fixed interval and keeps the
/// latest result in a flag shared with the rest of the session. The flag is
/// overwritten idempotently; it is the only state this task touches.
#[derive(Clone)]
pub struct HealthMonitor {
    client: ApiClient,
    healthy: Arc<AtomicBool>,
    interval: String,
}

impl HealthMonitor {
    pub fn new(client: ApiClient) -> HealthMonitor {
        return HealthMonitor {
            client,
            healthy: Arc::new(AtomicBool::new(false)),
            interval: Config::get(ConfigKey::HealthCheckInterval),
        };
    }

    pub fn is_healthy(&self) -> bool {
        return self.healthy.load(Ordering::Relaxed);
    }

    /// Runs one probe and records the result.
    pub async fn check_once(&self) -> bool {
        let healthy = self.client.check_health().await;

        if healthy != self.healthy.load(Ordering::Relaxed) {
            tracing::info!(healthy, "backend health changed");
        }
        self.healthy.store(healthy, Ordering::Relaxed);

        return healthy;
    }

    /// Polls forever. Spawn a clone; readers keep their own clone for
    /// [`is_healthy`](HealthMonitor::is_healthy).
    pub async fn start(&self) -> Result<()> {
        let millis = self.interval.parse::<u64>()?;
        let mut interval = tokio::time::interval(Duration::from_millis(millis));

        loop {
            interval.tick().await;
            self.check_once().await;
        }
    }
}
