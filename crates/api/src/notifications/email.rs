//! Transactional email over SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. If `SMTP_HOST`
//! is not set, [`EmailConfig::from_env`] returns `None` and no mailer is
//! constructed.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@saivd.local";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default               |
    /// |-----------------|----------|-----------------------|
    /// | `SMTP_HOST`     | yes      |                       |
    /// | `SMTP_PORT`     | no       | `587`                 |
    /// | `SMTP_FROM`     | no       | `noreply@saivd.local` |
    /// | `SMTP_USER`     | no       |                       |
    /// | `SMTP_PASSWORD` | no       |                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends account mail through a transport built once at startup.
pub struct EmailDelivery {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl EmailDelivery {
    /// Validate the sender address and open the STARTTLS relay pool.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let sender = Mailbox::new(Some(SENDER_NAME.to_string()), config.from_address.parse()?);
        let mut relay = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            relay = relay.credentials(Credentials::new(user.clone(), password.clone()));
        }
        Ok(Self {
            transport: relay.build(),
            sender,
        })
    }

    /// Send the post-signup welcome message.
    pub async fn send_welcome(
        &self,
        to_email: &str,
        display_name: &str,
        profile_url: &str,
    ) -> Result<(), EmailError> {
        let message = self.compose(to_email, &WelcomeEmail { display_name, profile_url })?;
        self.transport.send(message).await?;
        tracing::info!(to = to_email, "Welcome email sent");
        Ok(())
    }

    fn compose(&self, to_email: &str, welcome: &WelcomeEmail<'_>) -> Result<Message, EmailError> {
        Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, to_email.parse()?))
            .subject(WELCOME_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(welcome.body())
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

const SENDER_NAME: &str = "SAIVD";
const WELCOME_SUBJECT: &str = "Welcome to SAIVD";

struct WelcomeEmail<'a> {
    display_name: &'a str,
    profile_url: &'a str,
}

impl WelcomeEmail<'_> {
    fn body(&self) -> String {
        format!(
            "Hi {},\n\n\
             Your SAIVD account is ready. Upload a video to get started.\n\n\
             Your public profile: {}\n",
            self.display_name, self.profile_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            from_address: "noreply@saivd.local".to_string(),
            smtp_user: None,
            smtp_password: None,
        }
    }

    #[test]
    fn welcome_body_mentions_profile() {
        let body = WelcomeEmail {
            display_name: "ada",
            profile_url: "http://localhost:3000/profile/x",
        }
        .body();
        assert!(body.starts_with("Hi ada,"));
        assert!(body.contains("http://localhost:3000/profile/x"));
    }

    #[tokio::test]
    async fn composed_message_has_named_sender() {
        let delivery = EmailDelivery::new(&local_config()).unwrap();
        let welcome = WelcomeEmail {
            display_name: "ada",
            profile_url: "http://localhost:3000/profile/x",
        };
        let raw = String::from_utf8(delivery.compose("ada@example.com", &welcome).unwrap().formatted())
            .unwrap();
        assert!(raw.contains("From: SAIVD <noreply@saivd.local>"));
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Subject: Welcome to SAIVD"));
    }

    #[tokio::test]
    async fn bad_sender_is_rejected_at_startup() {
        let mut config = local_config();
        config.from_address = "not-an-email".to_string();
        assert!(matches!(EmailDelivery::new(&config), Err(EmailError::Address(_))));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn email_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = EmailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
