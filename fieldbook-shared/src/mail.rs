/// Outbound email
///
/// Fieldbook sends one kind of email: the password reset link. Delivery goes
/// through an HTTP mail relay (`POST {from, to, subject, html}` with a bearer
/// key). Without a configured relay the [`LogMailer`] only logs the message.
///
/// # Example
///
/// ```no_run
/// use fieldbook_shared::mail::{HttpMailer, Mailer, MailConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = HttpMailer::new(MailConfig {
///     api_url: "https://mail.example.com/v1/send".to_string(),
///     api_key: "key".to_string(),
///     from: "Fieldbook <no-reply@example.com>".to_string(),
///     timeout_secs: 10,
/// })?;
///
/// mailer.send("farmer@example.com", "Hello", "<p>Hi</p>").await?;
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail client configuration error: {0}")]
    Config(String),

    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Sends a single HTML email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError>;
}

/// Relay settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Delivers mail through the HTTP relay
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url,
            api_key: config.api_key,
            from: config.from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&OutgoingMail {
                from: &self.from,
                to,
                subject,
                html,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to, subject, "Email sent");
        Ok(())
    }
}

/// Logs instead of sending; used when no relay is configured
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailError> {
        tracing::info!(to, subject, bytes = html.len(), "Mail relay not configured, email not sent");
        Ok(())
    }
}

/// HTML body of the password reset email
pub fn password_reset_email(name: &str, reset_link: &str) -> String {
    let name = if name.trim().is_empty() { "User" } else { name };

    format!(
        r#"<html>
  <body>
    <div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
      <h2>Password Reset Request</h2>
      <p>Hello, {name},</p>
      <p>We received a request to reset your Fieldbook password. The link below is valid for one hour.</p>
      <p><a href="{reset_link}" style="background-color: #2f7d32; color: #fff; padding: 12px 24px; text-decoration: none; border-radius: 5px;">Reset Password</a></p>
      <p>If you didn't request a password reset, you can ignore this email.</p>
    </div>
  </body>
</html>"#
    )
}
