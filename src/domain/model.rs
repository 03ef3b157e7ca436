use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Everything a run needs, resolved once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub total_captures: u32,
    pub interval_seconds: u64,
    pub source_url: String,
    pub recipient: String,
    pub subject: String,
    pub rich_format: bool,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub temp_dir: PathBuf,
    pub mail_program: String,
}

impl RunConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

/// Downloaded image spooled to a temp file. Dropping it deletes the file.
#[derive(Debug)]
pub struct Payload {
    file: NamedTempFile,
    size: u64,
}

impl Payload {
    pub fn new(file: NamedTempFile, size: u64) -> Self {
        Self { file, size }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Deletes the spool file, surfacing the error that a plain drop would swallow.
    pub fn release(self) -> std::io::Result<()> {
        self.file.close()
    }
}

#[derive(Debug, Clone)]
pub struct CaptureMetadata {
    pub index: u32,
    pub total: u32,
    pub captured_at: DateTime<Local>,
    pub source_url: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOutcome {
    pub index: u32,
    pub downloaded: bool,
    pub delivered: bool,
}

impl CaptureOutcome {
    pub fn succeeded(&self) -> bool {
        self.downloaded && self.delivered
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTally {
    pub success_count: u32,
    pub failure_count: u32,
}

impl SessionTally {
    pub fn record(&mut self, outcome: &CaptureOutcome) {
        if outcome.succeeded() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    pub fn completed(&self) -> u32 {
        self.success_count + self.failure_count
    }

    pub fn all_succeeded(&self) -> bool {
        self.failure_count == 0
    }
}
