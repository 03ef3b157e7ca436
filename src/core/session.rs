use crate::adapters::storage::PayloadStore;
use crate::core::downloader::RetryingDownloader;
use crate::core::notifier::Notifier;
use crate::domain::model::{CaptureMetadata, CaptureOutcome, RunConfig, SessionTally};
use crate::domain::ports::{Fetcher, Mailer, Sleeper};
use chrono::Local;

/// Runs `total_captures` capture-and-deliver cycles, one at a time.
///
/// A failed download or a rejected delivery only fails its own capture;
/// the session always runs to the end and reports the tally.
pub struct CaptureSession<'a, F: Fetcher, M: Mailer, S: Sleeper> {
    config: &'a RunConfig,
    fetcher: &'a F,
    mailer: &'a M,
    sleeper: &'a S,
    store: &'a PayloadStore,
}

impl<'a, F: Fetcher, M: Mailer, S: Sleeper> CaptureSession<'a, F, M, S> {
    pub fn new(
        config: &'a RunConfig,
        fetcher: &'a F,
        mailer: &'a M,
        sleeper: &'a S,
        store: &'a PayloadStore,
    ) -> Self {
        Self {
            config,
            fetcher,
            mailer,
            sleeper,
            store,
        }
    }

    pub async fn run(&self) -> SessionTally {
        let total = self.config.total_captures;
        let mut tally = SessionTally::default();

        tracing::info!(
            "🎬 Starting session: {} captures every {}s from {}",
            total,
            self.config.interval_seconds,
            self.config.source_url
        );

        for index in 1..=total {
            tracing::info!("📸 Capture {}/{}", index, total);

            let outcome = self.run_capture(index).await;
            tracing::debug!(
                "Capture {}/{} {}",
                outcome.index,
                total,
                if outcome.succeeded() { "succeeded" } else { "failed" }
            );
            tally.record(&outcome);
            debug_assert_eq!(tally.completed(), index);

            if index < total {
                tracing::info!(
                    "⏳ Next capture in {}s ({}/{} done)",
                    self.config.interval_seconds,
                    index,
                    total
                );
                self.sleeper.sleep(self.config.interval()).await;
            }
        }

        log_summary(&tally, total);
        tally
    }

    async fn run_capture(&self, index: u32) -> CaptureOutcome {
        let total = self.config.total_captures;
        let downloader = RetryingDownloader::new(self.fetcher, self.sleeper, self.store);

        let payload = match downloader.attempt_capture(self.config).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("❌ Capture {}/{} failed: {}", index, total, e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                return CaptureOutcome {
                    index,
                    downloaded: false,
                    delivered: false,
                };
            }
        };

        let metadata = CaptureMetadata {
            index,
            total,
            captured_at: Local::now(),
            source_url: self.config.source_url.clone(),
            size_bytes: payload.size(),
        };

        let delivered = match Notifier::new(self.mailer)
            .deliver(&payload, &metadata, self.config)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("💡 {}", e.recovery_suggestion());
                false
            }
        };

        let spool = payload.path().to_path_buf();
        if let Err(e) = payload.release() {
            tracing::warn!("⚠️ Could not remove {}: {}", spool.display(), e);
        } else {
            tracing::debug!("Removed {}", spool.display());
        }

        CaptureOutcome {
            index,
            downloaded: true,
            delivered,
        }
    }
}

fn log_summary(tally: &SessionTally, total: u32) {
    if tally.all_succeeded() {
        tracing::info!(
            "🎉 Session complete: {}/{} captures delivered",
            tally.success_count,
            total
        );
    } else {
        tracing::warn!(
            "⚠️ Session complete: {} succeeded, {} failed, {} total",
            tally.success_count,
            tally.failure_count,
            total
        );
    }
}
