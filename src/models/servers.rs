use super::IngestError;
use crate::common::api_client::Endpoint;
use serde::Deserialize;
use serde_json::Value;

/// A media server registered in Wizarr (Plex, Jellyfin, Emby, ...).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub server_type: Option<String>,
    pub url: Option<String>,
}

impl ServerRecord {
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.server_type.as_deref().unwrap_or("unknown")
    }
}

/// `/servers` is the one endpoint with a third wrapper shape in the wild:
/// `{"servers": [...]}` in addition to `{"data": [...]}` and a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerListing {
    Data { data: Vec<ServerRecord> },
    Servers { servers: Vec<ServerRecord> },
    Bare(Vec<ServerRecord>),
}

pub(crate) fn parse(payload: &Value) -> Result<Vec<ServerRecord>, IngestError> {
    let listing: ServerListing =
        serde_json::from_value(payload.clone()).map_err(|source| IngestError {
            endpoint: Endpoint::Servers,
            source,
        })?;
    Ok(match listing {
        ServerListing::Data { data } => data,
        ServerListing::Servers { servers } => servers,
        ServerListing::Bare(servers) => servers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_servers_wrapper() {
        let servers = parse(&json!({"servers": [{"id": 1, "server_type": "plex"}]}))
            .expect("servers wrapper should parse");
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].type_label(), "plex");
    }

    #[test]
    fn parses_bare_array() {
        let servers =
            parse(&json!([{"id": 2, "name": "Backup Emby"}])).expect("bare array should parse");
        assert_eq!(servers[0].name.as_deref(), Some("Backup Emby"));
    }

    #[test]
    fn rejects_object_without_list() {
        assert!(parse(&json!({"count": 2})).is_err());
    }
}
