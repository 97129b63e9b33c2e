pub mod email;
pub mod invitation;

pub use email::{send_invitation_email, SendInvitationEmailInput};
pub use invitation::{
    create_invitation, CreateInvitationInput, InvitationOutcome, InvitationRequest,
};

use crate::common::api_client::ApiClientError;
use crate::email::EmailError;

/// Malformed action input.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("server_ids must contain at least one server ID")]
    EmptyServerIds,
    #[error("invalid server ID {0:?}: not a whole number")]
    InvalidServerId(String),
    #[error("invalid library ID {0:?}: not a whole number")]
    InvalidLibraryId(String),
    #[error("duration must be \"unlimited\" or a whole number of days, got {0:?}")]
    InvalidDuration(String),
    #[error("invalid recipient address {0:?}")]
    InvalidRecipient(String),
    #[error("invalid public URL {0:?}: {1}")]
    InvalidPublicUrl(String, url::ParseError),
}

/// Anything an action can fail with. Actions don't catch; the whole call
/// aborts and the error reaches the caller with these messages.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("API error: {0}")]
    Api(#[from] ApiClientError),
    #[error("no invitation URL received")]
    MissingInvitationUrl,
    #[error("invitation URL {url:?} cannot be parsed: {source}")]
    MalformedInvitationUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("email error: {0}")]
    Email(#[from] EmailError),
}
