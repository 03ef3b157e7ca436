use crate::domain::ports::{MailMessage, Mailer};
use crate::utils::error::{CaptureError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Hands messages to a mutt-compatible mail program.
#[derive(Debug, Clone)]
pub struct CommandMailer {
    program: String,
}

impl CommandMailer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves the program on `PATH`, or as-is when it already names a path.
    pub fn ensure_available(&self) -> Result<PathBuf> {
        find_program(&self.program).ok_or_else(|| CaptureError::MissingToolError {
            tool: self.program.clone(),
        })
    }

    pub fn build_args(message: &MailMessage<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if message.html_body.is_some() {
            args.push("-e".into());
            args.push("set content_type=text/html".into());
        }
        args.push("-s".into());
        args.push(message.subject.into());
        args.push("-a".into());
        args.push(message.attachment.as_os_str().to_os_string());
        args.push("--".into());
        args.push(message.recipient.into());
        args
    }

    fn delivery_error(&self, recipient: &str, message: String) -> CaptureError {
        CaptureError::DeliveryError {
            recipient: recipient.to_string(),
            message,
        }
    }
}

#[async_trait]
impl Mailer for CommandMailer {
    async fn send(&self, message: MailMessage<'_>) -> Result<()> {
        tracing::debug!(
            "Running {} for {} (attachment {})",
            self.program,
            message.recipient,
            message.attachment.display()
        );

        let mut child = Command::new(&self.program)
            .args(Self::build_args(&message))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                let reason = format!("failed to start {}: {}", self.program, e);
                self.delivery_error(message.recipient, reason)
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(body) = &message.html_body {
                // A program that exits without reading stdin is judged by its exit status.
                if let Err(e) = stdin.write_all(body.as_bytes()).await {
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        drop(stdin);
                        if let Err(kill_err) = child.kill().await {
                            tracing::warn!("Could not stop {}: {}", self.program, kill_err);
                        }
                        return Err(self.delivery_error(
                            message.recipient,
                            format!("failed to write message body: {}", e),
                        ));
                    }
                }
            }
        }

        let output = child.wait_with_output().await.map_err(|e| {
            let reason = format!("failed to wait for {}: {}", self.program, e);
            self.delivery_error(message.recipient, reason)
        })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(self.delivery_error(
            message.recipient,
            format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
        ))
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message<'a>(attachment: &'a Path, html_body: Option<String>) -> MailMessage<'a> {
        MailMessage {
            recipient: "ops@example.com",
            subject: "Camera capture",
            html_body,
            attachment,
        }
    }

    #[test]
    fn test_plain_args_have_no_content_type_override() {
        let attachment = Path::new("/tmp/capture_1.jpg");
        let args = CommandMailer::build_args(&message(attachment, None));

        let expected: Vec<OsString> = [
            "-s",
            "Camera capture",
            "-a",
            "/tmp/capture_1.jpg",
            "--",
            "ops@example.com",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn test_rich_args_switch_content_type_to_html() {
        let attachment = Path::new("/tmp/capture_1.jpg");
        let args = CommandMailer::build_args(&message(attachment, Some("<html></html>".into())));

        assert_eq!(args[0], OsString::from("-e"));
        assert_eq!(args[1], OsString::from("set content_type=text/html"));
        assert_eq!(args.last().unwrap(), &OsString::from("ops@example.com"));
    }

    #[test]
    fn test_missing_program_is_environment_error() {
        let mailer = CommandMailer::new("definitely-not-a-mailer-3f9a");
        let err = mailer.ensure_available().unwrap_err();

        assert!(matches!(err, CaptureError::MissingToolError { .. }));
        assert!(err.is_fatal());
    }

    #[cfg(unix)]
    #[test]
    fn test_program_found_on_path() {
        let mailer = CommandMailer::new("sh");
        assert!(mailer.ensure_available().is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_status_is_accepted() {
        let spool = tempfile::NamedTempFile::new().unwrap();
        let mailer = CommandMailer::new("true");

        let result = mailer.send(message(spool.path(), None)).await;
        tokio_test::assert_ok!(result);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_status_is_delivery_failure() {
        let spool = tempfile::NamedTempFile::new().unwrap();
        let mailer = CommandMailer::new("false");

        let err = mailer.send(message(spool.path(), None)).await.unwrap_err();
        assert!(matches!(err, CaptureError::DeliveryError { .. }));
        assert!(!err.is_fatal());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_body_larger_than_pipe_buffer_is_reaped_by_exit_status() {
        let spool = tempfile::NamedTempFile::new().unwrap();
        let body = "<p>frame</p>".repeat(200_000);

        let accepted = CommandMailer::new("true")
            .send(message(spool.path(), Some(body.clone())))
            .await;
        tokio_test::assert_ok!(accepted);

        let rejected = CommandMailer::new("false")
            .send(message(spool.path(), Some(body)))
            .await;
        assert!(matches!(rejected, Err(CaptureError::DeliveryError { .. })));
    }

    #[tokio::test]
    async fn test_unspawnable_program_is_delivery_failure() {
        let spool = tempfile::NamedTempFile::new().unwrap();
        let mailer = CommandMailer::new("definitely-not-a-mailer-3f9a");

        let err = mailer.send(message(spool.path(), None)).await.unwrap_err();
        assert!(matches!(err, CaptureError::DeliveryError { .. }));
    }
}
