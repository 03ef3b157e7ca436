#[cfg(feature = "cli")]
pub mod cli;
pub mod file_config;

use crate::domain::model::RunConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_email_address, validate_non_empty_string, validate_path, validate_positive_number,
    validate_url, Validate,
};
use std::path::PathBuf;

pub const DEFAULT_TOTAL_CAPTURES: u32 = 10;
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_SOURCE_URL: &str = "http://localhost/camera.jpg";
pub const DEFAULT_RECIPIENT: &str = "root@localhost";
pub const DEFAULT_SUBJECT: &str = "Camera capture";
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 5;
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_MAIL_PROGRAM: &str = "mutt";

pub fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("snap-mailer")
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("count", u64::from(self.total_captures), 1)?;
        validate_positive_number("max_retries", u64::from(self.max_retries), 1)?;
        validate_positive_number("timeout", self.fetch_timeout_seconds, 1)?;
        validate_url("url", &self.source_url)?;
        validate_email_address("recipient", &self.recipient)?;
        validate_non_empty_string("subject", &self.subject)?;
        validate_non_empty_string("mail_program", &self.mail_program)?;
        validate_path("temp_dir", &self.temp_dir.to_string_lossy())?;
        Ok(())
    }
}
