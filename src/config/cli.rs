use crate::config::file_config::FileConfig;
use crate::config::{
    default_temp_dir, DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_INTERVAL_SECONDS,
    DEFAULT_MAIL_PROGRAM, DEFAULT_MAX_RETRIES, DEFAULT_RECIPIENT, DEFAULT_RETRY_DELAY_SECONDS,
    DEFAULT_SOURCE_URL, DEFAULT_SUBJECT, DEFAULT_TOTAL_CAPTURES,
};
use crate::domain::model::RunConfig;
use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

/// Unset options fall back to the config file, then to built-in defaults.
#[derive(Debug, Clone, Parser)]
#[command(name = "snap-mailer", version)]
#[command(about = "Periodically download an image and email it as an attachment")]
pub struct CliConfig {
    /// Number of captures to take
    #[arg(short = 'n', long, env = "CAPTURE_COUNT")]
    pub count: Option<u32>,

    /// Seconds to wait between captures
    #[arg(short, long, env = "CAPTURE_INTERVAL")]
    pub interval: Option<u64>,

    /// Image URL to download
    #[arg(short, long, env = "CAPTURE_URL")]
    pub url: Option<String>,

    /// Email address that receives the captures
    #[arg(short, long, env = "CAPTURE_RECIPIENT")]
    pub recipient: Option<String>,

    /// Email subject line
    #[arg(short, long, env = "CAPTURE_SUBJECT")]
    pub subject: Option<String>,

    /// Directory for temporary image files
    #[arg(long, env = "CAPTURE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Send the bare attachment without an HTML body
    #[arg(
        long,
        env = "CAPTURE_NO_HTML",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub no_html: bool,

    /// Download attempts per capture
    #[arg(long, env = "CAPTURE_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Seconds to wait between download attempts
    #[arg(long, env = "CAPTURE_RETRY_DELAY")]
    pub retry_delay: Option<u64>,

    /// Per-download timeout in seconds
    #[arg(long, env = "CAPTURE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Mail program used to send messages (mutt-compatible)
    #[arg(long, env = "CAPTURE_MAIL_PROGRAM")]
    pub mail_program: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Help and version requests succeed; every other parse error is a usage error.
    pub fn exit_code_for(err: &clap::Error) -> i32 {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        }
    }

    pub fn resolve(&self, file: Option<&FileConfig>) -> RunConfig {
        let file = file.cloned().unwrap_or_default();

        RunConfig {
            total_captures: self
                .count
                .or(file.capture.count)
                .unwrap_or(DEFAULT_TOTAL_CAPTURES),
            interval_seconds: self
                .interval
                .or(file.capture.interval_seconds)
                .unwrap_or(DEFAULT_INTERVAL_SECONDS),
            source_url: self
                .url
                .clone()
                .or(file.capture.url)
                .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            recipient: self
                .recipient
                .clone()
                .or(file.mail.recipient)
                .unwrap_or_else(|| DEFAULT_RECIPIENT.to_string()),
            subject: self
                .subject
                .clone()
                .or(file.mail.subject)
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            rich_format: !self.no_html && file.mail.html.unwrap_or(true),
            max_retries: self
                .max_retries
                .or(file.retry.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay_seconds: self
                .retry_delay
                .or(file.retry.delay_seconds)
                .unwrap_or(DEFAULT_RETRY_DELAY_SECONDS),
            fetch_timeout_seconds: self
                .timeout
                .or(file.capture.timeout_seconds)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS),
            temp_dir: self
                .temp_dir
                .clone()
                .or(file.capture.temp_dir)
                .unwrap_or_else(default_temp_dir),
            mail_program: self
                .mail_program
                .clone()
                .or(file.mail.program)
                .unwrap_or_else(|| DEFAULT_MAIL_PROGRAM.to_string()),
        }
    }
}
