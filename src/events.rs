use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

pub const INVITATION_CREATED: &str = "wizarr_invitation_created";
pub const INVITATION_EMAIL_SENT: &str = "wizarr_invitation_email_sent";

/// Payload of a completion event.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    InvitationCreated {
        invitation_id: Option<i64>,
        invitation_code: Option<String>,
        invitation_url: String,
        /// Verbatim creation response from the API.
        response: Value,
    },
    InvitationEmailSent {
        recipient: String,
        invitation_id: Option<i64>,
        /// The URL that was actually embedded in the email, after any
        /// public-URL rewrite.
        invitation_url: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntegrationEvent {
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl IntegrationEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.payload {
            EventPayload::InvitationCreated { .. } => INVITATION_CREATED,
            EventPayload::InvitationEmailSent { .. } => INVITATION_EMAIL_SENT,
        }
    }
}

/// In-memory broadcast bus for completion events. Every subscriber gets its
/// own receiver; publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<IntegrationEvent>,
}

impl EventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<IntegrationEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, payload: EventPayload) {
        let event = IntegrationEvent {
            occurred_at: Utc::now(),
            payload,
        };
        debug!(event = event.name(), "publishing event");
        // A send error only means nobody is listening right now.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
