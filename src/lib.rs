pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{CommandMailer, HttpFetcher, PayloadStore, TokioSleeper};
pub use config::file_config::FileConfig;
pub use crate::core::{downloader::RetryingDownloader, notifier::Notifier, session::CaptureSession};
pub use domain::model::{RunConfig, SessionTally};
pub use utils::error::{CaptureError, Result};
