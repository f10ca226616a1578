use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::time;
use tokio_util::sync::CancellationToken;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

pub const MAX_RECONNECT_ATTEMPTS: u32 = 3;
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum FeedStatus {
    Connecting,
    Live,
    Retrying { attempt: u32 },
    /// Retries exhausted; the console keeps working without live updates.
    Degraded,
}

/// Bounded, fixed-delay reconnect bookkeeping for the live scan feed.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    connect_timeout: Duration,
    attempts: u32,
    status: FeedStatus,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY, CONNECT_TIMEOUT)
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration, connect_timeout: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            connect_timeout,
            attempts: 0,
            status: FeedStatus::Connecting,
        }
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn on_connected(&mut self) {
        self.attempts = 0;
        self.status = FeedStatus::Live;
    }

    /// Records a failed connect or a dropped connection. Returns how long to wait
    /// before the next attempt, or `None` once retries are used up.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if self.attempts < self.max_attempts {
            self.attempts += 1;
            self.status = FeedStatus::Retrying {
                attempt: self.attempts,
            };
            Some(self.delay)
        } else {
            self.status = FeedStatus::Degraded;
            None
        }
    }

    /// Manual reconnect from the operator: start counting again.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.status = FeedStatus::Connecting;
    }
}

/// Drives `connect` under the policy until it succeeds, retries run out, or `cancel` fires.
pub async fn connect_with_retry<F, Fut, T>(
    policy: &mut ReconnectPolicy,
    cancel: &CancellationToken,
    mut connect: F,
) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        match time::timeout(policy.connect_timeout(), connect()).await {
            Ok(Ok(connection)) => {
                policy.on_connected();
                log_info!("live feed connected");
                return Some(connection);
            }
            Ok(Err(err)) => log_warn!("live feed connect failed: {err:#}"),
            Err(_) => log_warn!(
                "live feed connect timed out after {}ms",
                policy.connect_timeout().as_millis()
            ),
        }

        let Some(delay) = policy.on_failure() else {
            log_warn!("live feed unavailable; continuing without live updates");
            return None;
        };

        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = time::sleep(delay) => {}
        }
    }
}
