use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use super::simulator::{BottleScanner, DetectedBottle};
use crate::policy::{resolve, PolicyTable, ResolvedRecommendation};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Debounced scan button: a trigger publishes a fresh bottle after `delay`,
/// and a second trigger while one is pending is refused.
///
/// Dropping the controller cancels any pending scan; `shutdown` also waits for it.
pub struct ScanController {
    scanner: Arc<Mutex<BottleScanner>>,
    latest: Arc<watch::Sender<Option<DetectedBottle>>>,
    scanning: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
    delay: Duration,
    cancel_token: CancellationToken,
}

impl ScanController {
    pub fn new(scanner: BottleScanner, delay: Duration) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            scanner: Arc::new(Mutex::new(scanner)),
            latest: Arc::new(latest),
            scanning: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
            delay,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Most recent reading, if any scan has completed.
    pub fn latest(&self) -> Option<DetectedBottle> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DetectedBottle>> {
        self.latest.subscribe()
    }

    pub fn recommendation(&self, table: &PolicyTable, airline: &str) -> Option<ResolvedRecommendation> {
        self.latest
            .borrow()
            .as_ref()
            .map(|bottle| resolve(table, airline, bottle))
    }

    pub async fn trigger(&self) -> Result<()> {
        // Held across the flag check so a handle is never swapped for a pending one.
        let mut task = self.task.lock().await;
        if self.cancel_token.is_cancelled() {
            bail!("scanner has been shut down");
        }
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            bail!("scan already in progress");
        }

        let scanner = self.scanner.clone();
        let latest = self.latest.clone();
        let scanning = self.scanning.clone();
        let cancel_token = self.cancel_token.clone();
        let delay = self.delay;

        log_debug!("scan triggered; reading in {}ms", delay.as_millis());

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    log_info!("pending scan dropped on shutdown");
                }
                _ = time::sleep(delay) => {
                    let bottle = scanner.lock().await.scan();
                    log_info!(
                        "scanned {} ({}) at {}% fill",
                        bottle.label,
                        bottle.sku,
                        bottle.fill_percent()
                    );
                    latest.send_replace(Some(bottle));
                }
            }
            scanning.store(false, Ordering::SeqCst);
        });

        *task = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.cancel_token.cancel();

        if let Some(handle) = self.task.lock().await.take() {
            handle
                .await
                .context("scan task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
