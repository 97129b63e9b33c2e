use super::invitation::{create_parsed, CreateInvitationInput, InvitationOutcome, InvitationRequest};
use super::{ActionError, ValidationError};
use crate::common::api_client::WizarrClient;
use crate::email::{
    InvitationDetails, InvitationEmailContent, Mailer, OutgoingEmail, SmtpMailer,
};
use crate::events::{EventBus, EventPayload};
use crate::models::Snapshot;
use serde::Deserialize;
use tracing::info;
use url::Url;
use validator::ValidateEmail;

pub const FALLBACK_SERVER_NAME: &str = "our media";
pub const FALLBACK_SERVER_TYPE: &str = "server";
/// From address when the SMTP account name is not a usable mailbox.
const DEFAULT_SENDER: &str = "wizarr-bridge@localhost";

fn default_true() -> bool {
    true
}

/// Raw `send_invitation_email` action input.
#[derive(Debug, Clone, Deserialize)]
pub struct SendInvitationEmailInput {
    pub recipient_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// STARTTLS by default; switched off only for test rigs and LAN relays.
    #[serde(default = "default_true")]
    pub smtp_use_tls: bool,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(flatten)]
    pub invitation: CreateInvitationInput,
}

fn validate_public_url(raw: &str) -> Result<String, ValidationError> {
    Url::parse(raw).map_err(|e| ValidationError::InvalidPublicUrl(raw.to_string(), e))?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// Graft the invitation URL's path and query onto the public base. The path
/// and query are carried over byte-identical; only scheme, host and port
/// change.
pub(crate) fn rewrite_invitation_url(
    invitation_url: &str,
    public_base: &str,
) -> Result<String, ActionError> {
    let parsed = Url::parse(invitation_url).map_err(|source| ActionError::MalformedInvitationUrl {
        url: invitation_url.to_string(),
        source,
    })?;
    let mut path_and_query = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }
    Ok(format!("{public_base}{path_and_query}"))
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display name and type for the first requested server found in the
/// snapshot. Unknown servers get the generic labels rather than an error.
fn resolve_server_label(snapshot: Option<&Snapshot>, server_ids: &[i64]) -> (String, String) {
    if let Some(snapshot) = snapshot {
        for id in server_ids {
            if let Some(server) = snapshot.server_by_id(*id) {
                let name = server
                    .name
                    .clone()
                    .unwrap_or_else(|| FALLBACK_SERVER_NAME.to_string());
                let server_type = server
                    .server_type
                    .as_deref()
                    .map_or_else(|| FALLBACK_SERVER_TYPE.to_string(), title_case);
                return (name, server_type);
            }
        }
    }
    (
        FALLBACK_SERVER_NAME.to_string(),
        FALLBACK_SERVER_TYPE.to_string(),
    )
}

/// Create an invitation and email it to the recipient. The invitation is
/// created first; an SMTP failure afterwards leaves it (and its created
/// event) intact and surfaces only the email error.
///
/// # Errors
/// * [`ActionError::Validation`] on a bad recipient, public URL or
///   invitation input; nothing is created in that case.
/// * [`ActionError::Api`] / [`ActionError::MissingInvitationUrl`] when the
///   creation call fails.
/// * [`ActionError::Email`] when the SMTP dispatch fails.
pub async fn send_invitation_email(
    client: &WizarrClient,
    snapshot: Option<&Snapshot>,
    events: &EventBus,
    input: &SendInvitationEmailInput,
) -> Result<InvitationOutcome, ActionError> {
    if !input.recipient_email.validate_email() {
        return Err(ValidationError::InvalidRecipient(input.recipient_email.clone()).into());
    }
    let public_base = input
        .public_url
        .as_deref()
        .map(validate_public_url)
        .transpose()?;
    let request = InvitationRequest::parse(&input.invitation)?;

    // Build the mailer before creating anything so a bad relay config fails
    // without side effects. Blank credentials mean an unauthenticated relay.
    let username = Some(input.smtp_username.clone()).filter(|u| !u.trim().is_empty());
    let password = Some(input.smtp_password.clone()).filter(|p| !p.trim().is_empty());
    let (smtp_user, smtp_pass) = match (username.clone(), password) {
        (Some(user), Some(pass)) => (Some(user), Some(pass)),
        _ => (None, None),
    };
    let mailer = SmtpMailer::new(
        &input.smtp_server,
        input.smtp_port,
        smtp_user,
        smtp_pass,
        input.smtp_use_tls,
    )?;

    let outcome = create_parsed(client, events, &request).await?;

    let invitation_url = match &public_base {
        Some(base) => {
            let rewritten = rewrite_invitation_url(&outcome.url, base)?;
            info!(url = %rewritten, "invitation URL rewritten to public base");
            rewritten
        }
        None => outcome.url.clone(),
    };

    let (server_name, server_type) = resolve_server_label(snapshot, &request.server_ids);
    let content = InvitationEmailContent::new(&InvitationDetails {
        subject: input.subject.clone(),
        server_name,
        server_type,
        invitation_url: invitation_url.clone(),
        expires_in_days: request.expires_in_days,
        allow_downloads: request.allow_downloads,
        allow_live_tv: request.allow_live_tv,
        allow_mobile_uploads: request.allow_mobile_uploads,
        limited_libraries: request.library_ids.is_some(),
    });

    let from = username.unwrap_or_else(|| DEFAULT_SENDER.to_string());
    let email = OutgoingEmail::new(
        from,
        input.recipient_email.clone(),
        content.subject,
        content.text,
        content.html,
    );
    mailer.send(&email).await?;

    info!(recipient = %input.recipient_email, "invitation email sent");
    events.publish(EventPayload::InvitationEmailSent {
        recipient: input.recipient_email.clone(),
        invitation_id: outcome.invitation_id,
        invitation_url,
    });
    Ok(outcome)
}
