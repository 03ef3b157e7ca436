use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// One retrieval attempt of a resource into `destination`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the number of bytes written. Network errors and non-success
    /// statuses are errors; an empty body is not, the caller decides.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage<'a> {
    pub recipient: &'a str,
    pub subject: &'a str,
    /// Rendered HTML body; `None` sends the attachment alone.
    pub html_body: Option<String>,
    pub attachment: &'a Path,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Ok means accepted for delivery, not received.
    async fn send(&self, message: MailMessage<'_>) -> Result<()>;
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
