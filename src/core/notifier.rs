use crate::domain::model::{CaptureMetadata, Payload, RunConfig};
use crate::domain::ports::{MailMessage, Mailer};
use crate::utils::error::Result;

/// Delivers one payload per call. Delivery is never retried.
pub struct Notifier<'a, M: Mailer> {
    mailer: &'a M,
}

impl<'a, M: Mailer> Notifier<'a, M> {
    pub fn new(mailer: &'a M) -> Self {
        Self { mailer }
    }

    pub async fn deliver(
        &self,
        payload: &Payload,
        metadata: &CaptureMetadata,
        config: &RunConfig,
    ) -> Result<()> {
        let html_body = config.rich_format.then(|| render_html_body(metadata));

        tracing::info!(
            "📧 Sending capture {}/{} to {}{}",
            metadata.index,
            metadata.total,
            config.recipient,
            if html_body.is_some() { " (html)" } else { "" }
        );

        let message = MailMessage {
            recipient: &config.recipient,
            subject: &config.subject,
            html_body,
            attachment: payload.path(),
        };

        match self.mailer.send(message).await {
            Ok(()) => {
                tracing::info!("✅ Capture {}/{} sent", metadata.index, metadata.total);
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    "❌ Capture {}/{} not sent: {}",
                    metadata.index,
                    metadata.total,
                    e
                );
                Err(e)
            }
        }
    }
}

pub fn render_html_body(metadata: &CaptureMetadata) -> String {
    let timestamp = metadata.captured_at.format("%Y-%m-%d %H:%M:%S");
    let source = escape_html(&metadata.source_url);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Camera capture {index}/{total}</title>
</head>
<body style="font-family: sans-serif;">
<h2>Camera capture {index}/{total}</h2>
<table cellpadding="4">
<tr><td><b>Captured at</b></td><td>{timestamp}</td></tr>
<tr><td><b>Capture</b></td><td>{index} of {total}</td></tr>
<tr><td><b>Source</b></td><td><a href="{source}">{source}</a></td></tr>
<tr><td><b>Size</b></td><td>{size} bytes</td></tr>
<tr><td><b>Status</b></td><td style="color: green;">Captured successfully</td></tr>
</table>
<p>The image is attached to this message.</p>
</body>
</html>
"#,
        index = metadata.index,
        total = metadata.total,
        timestamp = timestamp,
        source = source,
        size = metadata.size_bytes,
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
