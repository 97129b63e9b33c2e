pub mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;
pub use templates::{InvitationDetails, InvitationEmailContent, DEFAULT_SUBJECT};

use async_trait::async_trait;
use thiserror::Error;

/// Email sending error, kept distinct from API errors so callers can tell
/// "invitation created but email failed" from "invitation never created".
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid mail configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("failed to send email: {0}")]
    Send(String),
}

/// A fully rendered outgoing message.
#[derive(Debug, Clone, derive_more::Constructor)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Seam between the email action and the transport, so tests can capture
/// messages without a network.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}
