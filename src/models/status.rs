use super::IngestError;
use crate::common::api_client::Endpoint;
use serde::Deserialize;
use serde_json::Value;

/// Summary counters reported by `/status`. Wizarr versions differ in which
/// fields they include, so everything is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusInfo {
    pub version: Option<String>,
    pub total_users: Option<i64>,
    pub total_invitations: Option<i64>,
    pub total_requests: Option<i64>,
}

pub(crate) fn parse(payload: &Value) -> Result<StatusInfo, IngestError> {
    serde_json::from_value(payload.clone()).map_err(|source| IngestError {
        endpoint: Endpoint::Status,
        source,
    })
}
