pub mod api_keys;
pub mod invitations;
pub mod libraries;
pub mod servers;
pub mod status;
pub mod users;

pub use api_keys::ApiKeyRecord;
pub use invitations::InvitationRecord;
pub use libraries::LibraryRecord;
pub use servers::ServerRecord;
pub use status::StatusInfo;
pub use users::UserRecord;

use crate::common::api_client::Endpoint;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// List endpoints answer either a bare array or a `{"data": [...]}` wrapper,
/// depending on the Wizarr version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

#[derive(Debug, thiserror::Error)]
#[error("malformed {endpoint} payload: {source}")]
pub struct IngestError {
    pub endpoint: Endpoint,
    #[source]
    pub source: serde_json::Error,
}

pub(crate) fn parse_records<T: DeserializeOwned>(
    endpoint: Endpoint,
    payload: &Value,
) -> Result<Vec<T>, IngestError> {
    let listing: Listing<T> =
        serde_json::from_value(payload.clone()).map_err(|source| IngestError { endpoint, source })?;
    Ok(match listing {
        Listing::Wrapped { data } => data,
        Listing::Bare(items) => items,
    })
}

/// Raw JSON bodies of one refresh cycle, keyed by endpoint.
#[derive(Debug, Clone, Default)]
pub struct RawPayloads {
    pub status: Value,
    pub users: Value,
    pub invitations: Value,
    pub libraries: Value,
    pub servers: Value,
    pub api_keys: Value,
}

impl RawPayloads {
    pub fn set(&mut self, endpoint: Endpoint, payload: Value) {
        match endpoint {
            Endpoint::Status => self.status = payload,
            Endpoint::Users => self.users = payload,
            Endpoint::Invitations => self.invitations = payload,
            Endpoint::Libraries => self.libraries = payload,
            Endpoint::Servers => self.servers = payload,
            Endpoint::ApiKeys => self.api_keys = payload,
        }
    }

    #[must_use]
    pub fn get(&self, endpoint: Endpoint) -> &Value {
        match endpoint {
            Endpoint::Status => &self.status,
            Endpoint::Users => &self.users,
            Endpoint::Invitations => &self.invitations,
            Endpoint::Libraries => &self.libraries,
            Endpoint::Servers => &self.servers,
            Endpoint::ApiKeys => &self.api_keys,
        }
    }
}

/// One refresh cycle's worth of Wizarr state. Built whole on ingress and never
/// mutated afterwards; the coordinator swaps entire snapshots behind an `Arc`.
/// The raw payloads are kept alongside the typed records because sensors
/// expose them verbatim as diagnostic attributes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: StatusInfo,
    pub users: Vec<UserRecord>,
    pub invitations: Vec<InvitationRecord>,
    pub libraries: Vec<LibraryRecord>,
    pub servers: Vec<ServerRecord>,
    pub api_keys: Vec<ApiKeyRecord>,
    pub raw: RawPayloads,
}

impl Snapshot {
    /// Convert one cycle's raw payloads into typed records.
    ///
    /// # Errors
    /// If any payload doesn't match the expected shape for its endpoint.
    pub fn ingest(raw: RawPayloads) -> Result<Self, IngestError> {
        let status = status::parse(&raw.status)?;
        let users = parse_records(Endpoint::Users, &raw.users)?;
        let invitations = parse_records(Endpoint::Invitations, &raw.invitations)?;
        let libraries = parse_records(Endpoint::Libraries, &raw.libraries)?;
        let servers = servers::parse(&raw.servers)?;
        let api_keys = parse_records(Endpoint::ApiKeys, &raw.api_keys)?;
        Ok(Self {
            status,
            users,
            invitations,
            libraries,
            servers,
            api_keys,
            raw,
        })
    }

    #[must_use]
    pub fn raw(&self, endpoint: Endpoint) -> &Value {
        self.raw.get(endpoint)
    }

    #[must_use]
    pub fn server_by_id(&self, id: i64) -> Option<&ServerRecord> {
        self.servers.iter().find(|server| server.id == Some(id))
    }
}
