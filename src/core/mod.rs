pub mod downloader;
pub mod notifier;
pub mod session;

pub use crate::domain::model::{CaptureMetadata, CaptureOutcome, Payload, RunConfig, SessionTally};
pub use crate::domain::ports::{Fetcher, MailMessage, Mailer, Sleeper};
pub use crate::utils::error::Result;
