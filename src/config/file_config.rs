use crate::utils::error::{CaptureError, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Optional TOML configuration. Every key may be omitted; flags and
/// environment variables take precedence over anything set here.
///
/// ```toml
/// [capture]
/// count = 24
/// interval_seconds = 300
/// url = "https://cams.example.org/junction-4.jpg"
///
/// [retry]
/// max_retries = 3
/// delay_seconds = 5
///
/// [mail]
/// recipient = "${CAM_RECIPIENT}"
/// html = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub mail: MailSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureSection {
    pub count: Option<u32>,
    pub interval_seconds: Option<u64>,
    pub url: Option<String>,
    pub temp_dir: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    pub delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSection {
    pub recipient: Option<String>,
    pub subject: Option<String>,
    pub html: Option<bool>,
    pub program: Option<String>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CaptureError::ConfigValidationError {
                field: "config".to_string(),
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            }
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CaptureError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CaptureError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}
