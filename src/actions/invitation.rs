use super::{ActionError, ValidationError};
use crate::common::api_client::WizarrClient;
use crate::events::{EventBus, EventPayload};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

/// Raw `create_invitation` action input. ID lists arrive as comma-separated
/// strings, matching the action schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInvitationInput {
    pub server_ids: String,
    #[serde(default)]
    pub expires_in_days: Option<u32>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub library_ids: Option<String>,
    #[serde(default)]
    pub allow_downloads: bool,
    #[serde(default)]
    pub allow_live_tv: bool,
    #[serde(default)]
    pub allow_mobile_uploads: bool,
}

/// Validated, wire-shaped invitation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationRequest {
    pub server_ids: Vec<i64>,
    pub expires_in_days: Option<u32>,
    pub duration: Option<String>,
    pub library_ids: Option<Vec<i64>>,
    pub allow_downloads: bool,
    pub allow_live_tv: bool,
    pub allow_mobile_uploads: bool,
}

fn parse_id_list(
    raw: &str,
    invalid: impl Fn(String) -> ValidationError,
) -> Result<Vec<i64>, ValidationError> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        ids.push(part.parse::<i64>().map_err(|_| invalid(part.to_string()))?);
    }
    Ok(ids)
}

impl InvitationRequest {
    /// Validate raw action input.
    ///
    /// # Errors
    /// * If the server ID list is empty or contains a non-numeric entry.
    /// * If a library ID is non-numeric.
    /// * If `duration` is neither `"unlimited"` nor an integer string.
    pub fn parse(input: &CreateInvitationInput) -> Result<Self, ValidationError> {
        let server_ids = parse_id_list(&input.server_ids, ValidationError::InvalidServerId)?;
        if server_ids.is_empty() {
            return Err(ValidationError::EmptyServerIds);
        }

        // An empty duration string means "not set", same as omitting it.
        let duration = input
            .duration
            .as_deref()
            .map(str::trim)
            .filter(|duration| !duration.is_empty())
            .map(str::to_string);
        if let Some(duration) = &duration {
            if duration != "unlimited" && duration.parse::<u64>().is_err() {
                return Err(ValidationError::InvalidDuration(duration.clone()));
            }
        }

        let library_ids = match &input.library_ids {
            Some(raw) => {
                let ids = parse_id_list(raw, ValidationError::InvalidLibraryId)?;
                if ids.is_empty() {
                    None
                } else {
                    Some(ids)
                }
            }
            None => None,
        };

        Ok(Self {
            server_ids,
            expires_in_days: input.expires_in_days,
            duration,
            library_ids,
            allow_downloads: input.allow_downloads,
            allow_live_tv: input.allow_live_tv,
            allow_mobile_uploads: input.allow_mobile_uploads,
        })
    }

    /// POST body for the invitations endpoint. Optional fields are omitted
    /// entirely rather than sent as null; `unlimited` is set when no duration
    /// was requested.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("server_ids".to_string(), json!(self.server_ids));
        if let Some(days) = self.expires_in_days {
            body.insert("expires_in_days".to_string(), json!(days));
        }
        match &self.duration {
            Some(duration) => body.insert("duration".to_string(), json!(duration)),
            None => body.insert("unlimited".to_string(), json!(true)),
        };
        if let Some(ids) = &self.library_ids {
            body.insert("library_ids".to_string(), json!(ids));
        }
        if self.allow_downloads {
            body.insert("allow_downloads".to_string(), json!(true));
        }
        if self.allow_live_tv {
            body.insert("allow_live_tv".to_string(), json!(true));
        }
        if self.allow_mobile_uploads {
            body.insert("allow_mobile_uploads".to_string(), json!(true));
        }
        Value::Object(body)
    }
}

/// What a successful creation call yields.
#[derive(Debug, Clone)]
pub struct InvitationOutcome {
    pub invitation_id: Option<i64>,
    pub invitation_code: Option<String>,
    pub url: String,
    /// Verbatim API response.
    pub response: Value,
}

/// The invitation record is nested under `"invitation"` on current Wizarr
/// versions and at the root on older ones.
fn extract_outcome(response: Value) -> Result<InvitationOutcome, ActionError> {
    let record = response.get("invitation").unwrap_or(&response);
    let url = record
        .get("url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ActionError::MissingInvitationUrl)?;
    let invitation_id = record.get("id").and_then(Value::as_i64);
    let invitation_code = record
        .get("code")
        .and_then(Value::as_str)
        .map(str::to_string);
    Ok(InvitationOutcome {
        invitation_id,
        invitation_code,
        url,
        response,
    })
}

pub(crate) async fn create_parsed(
    client: &WizarrClient,
    events: &EventBus,
    request: &InvitationRequest,
) -> Result<InvitationOutcome, ActionError> {
    let response = client.create_invitation(&request.to_payload()).await?;
    let outcome = extract_outcome(response)?;
    info!(
        invitation_id = ?outcome.invitation_id,
        url = %outcome.url,
        "invitation created"
    );
    events.publish(EventPayload::InvitationCreated {
        invitation_id: outcome.invitation_id,
        invitation_code: outcome.invitation_code.clone(),
        invitation_url: outcome.url.clone(),
        response: outcome.response.clone(),
    });
    Ok(outcome)
}

/// Create an invitation: validate, POST once, extract the invitation URL and
/// publish the created event. Errors from the API client propagate unchanged,
/// and no event is published on failure.
///
/// # Errors
/// * [`ActionError::Validation`] on malformed input.
/// * [`ActionError::Api`] when the API call fails.
/// * [`ActionError::MissingInvitationUrl`] when the response has no URL.
pub async fn create_invitation(
    client: &WizarrClient,
    events: &EventBus,
    input: &CreateInvitationInput,
) -> Result<InvitationOutcome, ActionError> {
    let request = InvitationRequest::parse(input)?;
    create_parsed(client, events, &request).await
}
