use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Server returned status {status} for {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("Server returned an empty payload for {url}")]
    EmptyPayloadError { url: String },

    #[error("Download failed after {attempts} attempts: {url}")]
    DownloadExhaustedError { url: String, attempts: u32 },

    #[error("Mail delivery to {recipient} failed: {message}")]
    DeliveryError { recipient: String, message: String },

    #[error("Required tool not found: {tool}")]
    MissingToolError { tool: String },

    #[error("Temp storage unavailable at {path}: {message}")]
    TempStorageError { path: String, message: String },

    #[error("Could not create a spool file in {path}: {message}")]
    SpoolError { path: String, message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Download,
    Delivery,
    Environment,
    Configuration,
}

impl CaptureError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CaptureError::HttpError(_)
            | CaptureError::IoError(_)
            | CaptureError::HttpStatusError { .. }
            | CaptureError::EmptyPayloadError { .. }
            | CaptureError::SpoolError { .. }
            | CaptureError::DownloadExhaustedError { .. } => ErrorCategory::Download,
            CaptureError::DeliveryError { .. } => ErrorCategory::Delivery,
            CaptureError::MissingToolError { .. } | CaptureError::TempStorageError { .. } => {
                ErrorCategory::Environment
            }
            CaptureError::ConfigValidationError { .. }
            | CaptureError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// Fatal errors come from startup checks and abort the run before the
    /// first capture; the rest only fail the capture they occurred in.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Environment | ErrorCategory::Configuration
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CaptureError::HttpError(_) | CaptureError::HttpStatusError { .. } => {
                "Check that the source URL is reachable and serves the image".to_string()
            }
            CaptureError::EmptyPayloadError { .. } => {
                "The server answered without content; the camera may be offline".to_string()
            }
            CaptureError::DownloadExhaustedError { .. } => {
                "Increase --max-retries or --retry-delay if the source is flaky".to_string()
            }
            CaptureError::DeliveryError { .. } => {
                "Check the mail program configuration and the recipient address".to_string()
            }
            CaptureError::MissingToolError { tool } => {
                format!("Install '{}' or point --mail-program at an existing binary", tool)
            }
            CaptureError::TempStorageError { .. }
            | CaptureError::SpoolError { .. }
            | CaptureError::IoError(_) => {
                "Make sure the temp directory is writable or choose another with --temp-dir"
                    .to_string()
            }
            CaptureError::ConfigValidationError { field, .. }
            | CaptureError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting (see --help)", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Download => format!("Could not download the image: {}", self),
            ErrorCategory::Delivery => format!("Could not send the email: {}", self),
            ErrorCategory::Environment => format!("Environment is not ready: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
