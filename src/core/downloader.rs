use crate::adapters::storage::PayloadStore;
use crate::domain::model::{Payload, RunConfig};
use crate::domain::ports::{Fetcher, Sleeper};
use crate::utils::error::{CaptureError, Result};

/// Bounded-retry wrapper around a [`Fetcher`]: up to `max_retries` attempts,
/// a fixed delay between them, and a non-empty body required for acceptance.
pub struct RetryingDownloader<'a, F: Fetcher, S: Sleeper> {
    fetcher: &'a F,
    sleeper: &'a S,
    store: &'a PayloadStore,
}

impl<'a, F: Fetcher, S: Sleeper> RetryingDownloader<'a, F, S> {
    pub fn new(fetcher: &'a F, sleeper: &'a S, store: &'a PayloadStore) -> Self {
        Self {
            fetcher,
            sleeper,
            store,
        }
    }

    pub async fn attempt_capture(&self, config: &RunConfig) -> Result<Payload> {
        let max_attempts = config.max_retries.max(1);

        for attempt in 1..=max_attempts {
            tracing::info!(
                "⬇️ Download attempt {}/{} from {}",
                attempt,
                max_attempts,
                config.source_url
            );

            match self.try_once(&config.source_url).await {
                Ok(payload) => {
                    tracing::info!(
                        "✅ Downloaded {} bytes on attempt {}/{}",
                        payload.size(),
                        attempt,
                        max_attempts
                    );
                    return Ok(payload);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Attempt {}/{} rejected: {}", attempt, max_attempts, e);
                }
            }

            if attempt < max_attempts {
                tracing::debug!("Retrying in {}s", config.retry_delay_seconds);
                self.sleeper.sleep(config.retry_delay()).await;
            }
        }

        tracing::error!(
            "❌ Giving up on {} after {} attempts",
            config.source_url,
            max_attempts
        );
        Err(CaptureError::DownloadExhaustedError {
            url: config.source_url.clone(),
            attempts: max_attempts,
        })
    }

    /// The spool is dropped (and deleted) on every rejected path.
    async fn try_once(&self, url: &str) -> Result<Payload> {
        let spool = self.store.allocate()?;
        let written = self.fetcher.fetch(url, spool.path()).await?;
        if written == 0 {
            return Err(CaptureError::EmptyPayloadError {
                url: url.to_string(),
            });
        }
        Ok(Payload::new(spool, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    enum Step {
        Body(&'static [u8]),
        Fail,
    }

    struct ScriptedFetcher {
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<u32>,
    }

    impl ScriptedFetcher {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
            *self.calls.lock().unwrap() += 1;
            let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Fail);
            match step {
                Step::Body(bytes) => {
                    std::fs::write(destination, bytes)?;
                    Ok(bytes.len() as u64)
                }
                Step::Fail => Err(CaptureError::HttpStatusError {
                    url: url.to_string(),
                    status: 500,
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSleeper {
        naps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.naps.lock().unwrap().push(duration);
        }
    }

    fn config(max_retries: u32, temp_dir: PathBuf) -> RunConfig {
        RunConfig {
            total_captures: 1,
            interval_seconds: 60,
            source_url: "http://camera.local/snap.jpg".to_string(),
            recipient: "ops@example.com".to_string(),
            subject: "Camera capture".to_string(),
            rich_format: true,
            max_retries,
            retry_delay_seconds: 5,
            fetch_timeout_seconds: 30,
            temp_dir,
            mail_program: "mutt".to_string(),
        }
    }

    fn spool_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let dir = TempDir::new().unwrap();
        let store = PayloadStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![Step::Body(b"jpeg")]);
        let sleeper = RecordingSleeper::default();

        let payload = RetryingDownloader::new(&fetcher, &sleeper, &store)
            .attempt_capture(&config(3, dir.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(payload.size(), 4);
        assert_eq!(std::fs::read(payload.path()).unwrap(), b"jpeg");
        assert!(sleeper.naps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_two_failures() {
        let dir = TempDir::new().unwrap();
        let store = PayloadStore::new(dir.path());
        let fetcher =
            ScriptedFetcher::new(vec![Step::Fail, Step::Body(b""), Step::Body(b"frame")]);
        let sleeper = RecordingSleeper::default();

        let payload = RetryingDownloader::new(&fetcher, &sleeper, &store)
            .attempt_capture(&config(3, dir.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(payload.size(), 5);
        assert_eq!(
            *sleeper.naps.lock().unwrap(),
            vec![Duration::from_secs(5), Duration::from_secs(5)]
        );
        // Rejected spools are gone; only the accepted one remains.
        assert_eq!(spool_count(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_empty_bodies_exhaust_retries_without_trailing_sleep() {
        let dir = TempDir::new().unwrap();
        let store = PayloadStore::new(dir.path());
        let fetcher =
            ScriptedFetcher::new(vec![Step::Body(b""), Step::Body(b""), Step::Body(b"")]);
        let sleeper = RecordingSleeper::default();

        let err = RetryingDownloader::new(&fetcher, &sleeper, &store)
            .attempt_capture(&config(3, dir.path().to_path_buf()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CaptureError::DownloadExhaustedError { attempts: 3, .. }
        ));
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(sleeper.naps.lock().unwrap().len(), 2);
        assert_eq!(spool_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_single_retry_budget_never_sleeps() {
        let dir = TempDir::new().unwrap();
        let store = PayloadStore::new(dir.path());
        let fetcher = ScriptedFetcher::new(vec![Step::Fail, Step::Body(b"late")]);
        let sleeper = RecordingSleeper::default();

        let result = RetryingDownloader::new(&fetcher, &sleeper, &store)
            .attempt_capture(&config(1, dir.path().to_path_buf()))
            .await;

        tokio_test::assert_err!(result);
        assert_eq!(fetcher.calls(), 1);
        assert!(sleeper.naps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unwritable_store_counts_as_rejected_attempt() {
        let dir = TempDir::new().unwrap();
        let store = PayloadStore::new(dir.path().join("missing"));
        let fetcher = ScriptedFetcher::new(vec![Step::Body(b"jpeg")]);
        let sleeper = RecordingSleeper::default();

        let result = RetryingDownloader::new(&fetcher, &sleeper, &store)
            .attempt_capture(&config(2, dir.path().to_path_buf()))
            .await;

        tokio_test::assert_err!(result);
        assert_eq!(fetcher.calls(), 0);
    }
}
