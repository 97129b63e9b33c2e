use crate::common::api_client::Endpoint;
use crate::coordinator::RefreshUpdate;
use crate::models::Snapshot;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

/// The six read-only views projected out of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorKind {
    Status,
    Users,
    Invitations,
    Libraries,
    Servers,
    ApiKeys,
}

impl SensorKind {
    pub const ALL: [SensorKind; 6] = [
        SensorKind::Status,
        SensorKind::Users,
        SensorKind::Invitations,
        SensorKind::Libraries,
        SensorKind::Servers,
        SensorKind::ApiKeys,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Status => "Status",
            SensorKind::Users => "Users",
            SensorKind::Invitations => "Invitations",
            SensorKind::Libraries => "Libraries",
            SensorKind::Servers => "Servers",
            SensorKind::ApiKeys => "API Keys",
        }
    }

    #[must_use]
    pub fn endpoint(self) -> Endpoint {
        match self {
            SensorKind::Status => Endpoint::Status,
            SensorKind::Users => Endpoint::Users,
            SensorKind::Invitations => Endpoint::Invitations,
            SensorKind::Libraries => Endpoint::Libraries,
            SensorKind::Servers => Endpoint::Servers,
            SensorKind::ApiKeys => Endpoint::ApiKeys,
        }
    }

    /// Project this sensor's state and attributes out of a snapshot. Pure:
    /// the same snapshot always yields the same reading.
    #[must_use]
    pub fn compute(self, snapshot: &Snapshot) -> SensorReading {
        if snapshot.raw(self.endpoint()).is_null() {
            return SensorReading::unavailable();
        }
        match self {
            SensorKind::Status => compute_status(snapshot),
            SensorKind::Users => compute_users(snapshot),
            SensorKind::Invitations => compute_invitations(snapshot),
            SensorKind::Libraries => compute_libraries(snapshot),
            SensorKind::Servers => compute_servers(snapshot),
            SensorKind::ApiKeys => compute_api_keys(snapshot),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorState {
    Text(String),
    Count(usize),
    Unavailable,
}

impl fmt::Display for SensorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorState::Text(text) => f.write_str(text),
            SensorState::Count(count) => write!(f, "{count}"),
            SensorState::Unavailable => f.write_str("unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub state: SensorState,
    pub attributes: Map<String, Value>,
}

impl SensorReading {
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            state: SensorState::Unavailable,
            attributes: Map::new(),
        }
    }
}

fn count_by<'a, T>(items: &'a [T], label: impl Fn(&'a T) -> &'a str) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(label(item)).or_insert(0) += 1;
    }
    counts
}

fn base_attributes(snapshot: &Snapshot, endpoint: Endpoint) -> Map<String, Value> {
    let mut attributes = Map::new();
    attributes.insert("raw_data".to_string(), snapshot.raw(endpoint).clone());
    attributes
}

fn compute_status(snapshot: &Snapshot) -> SensorReading {
    let status = &snapshot.status;
    let state = match &status.version {
        Some(version) => SensorState::Text(version.clone()),
        None => SensorState::Text("online".to_string()),
    };

    let mut attributes = base_attributes(snapshot, Endpoint::Status);
    if let Some(version) = &status.version {
        attributes.insert("version".to_string(), json!(version));
    }
    if let Some(total) = status.total_users {
        attributes.insert("total_users".to_string(), json!(total));
    }
    if let Some(total) = status.total_invitations {
        attributes.insert("total_invitations".to_string(), json!(total));
    }
    if let Some(total) = status.total_requests {
        attributes.insert("total_requests".to_string(), json!(total));
    }
    SensorReading { state, attributes }
}

fn compute_users(snapshot: &Snapshot) -> SensorReading {
    let mut attributes = base_attributes(snapshot, Endpoint::Users);
    attributes.insert("total_users".to_string(), json!(snapshot.users.len()));
    attributes.insert(
        "users_by_server".to_string(),
        json!(count_by(&snapshot.users, |user| user.server_type_label())),
    );
    SensorReading {
        state: SensorState::Count(snapshot.users.len()),
        attributes,
    }
}

fn compute_invitations(snapshot: &Snapshot) -> SensorReading {
    let mut attributes = base_attributes(snapshot, Endpoint::Invitations);
    attributes.insert(
        "total_invitations".to_string(),
        json!(snapshot.invitations.len()),
    );
    attributes.insert(
        "invitations_by_status".to_string(),
        json!(count_by(&snapshot.invitations, |invitation| {
            invitation.status_label()
        })),
    );
    SensorReading {
        state: SensorState::Count(snapshot.invitations.len()),
        attributes,
    }
}

fn compute_libraries(snapshot: &Snapshot) -> SensorReading {
    let mut attributes = base_attributes(snapshot, Endpoint::Libraries);
    attributes.insert("total_libraries".to_string(), json!(snapshot.libraries.len()));
    attributes.insert(
        "libraries_by_server".to_string(),
        json!(count_by(&snapshot.libraries, |library| library.server_label())),
    );
    SensorReading {
        state: SensorState::Count(snapshot.libraries.len()),
        attributes,
    }
}

fn compute_servers(snapshot: &Snapshot) -> SensorReading {
    let mut attributes = base_attributes(snapshot, Endpoint::Servers);
    attributes.insert("total_servers".to_string(), json!(snapshot.servers.len()));
    attributes.insert(
        "servers_by_type".to_string(),
        json!(count_by(&snapshot.servers, |server| server.type_label())),
    );
    SensorReading {
        state: SensorState::Count(snapshot.servers.len()),
        attributes,
    }
}

fn compute_api_keys(snapshot: &Snapshot) -> SensorReading {
    let active = snapshot.api_keys.iter().filter(|key| key.is_active()).count();
    let mut attributes = base_attributes(snapshot, Endpoint::ApiKeys);
    attributes.insert("total_api_keys".to_string(), json!(snapshot.api_keys.len()));
    attributes.insert("active_api_keys".to_string(), json!(active));
    attributes.insert(
        "inactive_api_keys".to_string(),
        json!(snapshot.api_keys.len() - active),
    );
    SensorReading {
        state: SensorState::Count(snapshot.api_keys.len()),
        attributes,
    }
}

#[derive(Default)]
struct PanelState {
    readings: BTreeMap<SensorKind, SensorReading>,
    available: bool,
}

/// Caches the latest reading per sensor, driven by coordinator updates. This
/// is what an embedding host reads instead of recomputing projections on
/// every query.
#[derive(Default)]
pub struct SensorPanel {
    state: RwLock<PanelState>,
}

impl SensorPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinator subscriber entry point.
    pub fn observe(&self, update: &RefreshUpdate) {
        let mut state = self.state.write().expect("sensor panel lock poisoned");
        match update {
            RefreshUpdate::Refreshed(snapshot) => {
                for kind in SensorKind::ALL {
                    state.readings.insert(kind, kind.compute(snapshot));
                }
                state.available = true;
            }
            RefreshUpdate::Unavailable => {
                state.available = false;
            }
        }
    }

    #[must_use]
    pub fn reading(&self, kind: SensorKind) -> Option<SensorReading> {
        self.state
            .read()
            .expect("sensor panel lock poisoned")
            .readings
            .get(&kind)
            .cloned()
    }

    #[must_use]
    pub fn readings(&self) -> BTreeMap<SensorKind, SensorReading> {
        self.state
            .read()
            .expect("sensor panel lock poisoned")
            .readings
            .clone()
    }

    /// False after a failed refresh: cached readings are stale.
    #[must_use]
    pub fn available(&self) -> bool {
        self.state
            .read()
            .expect("sensor panel lock poisoned")
            .available
    }
}
