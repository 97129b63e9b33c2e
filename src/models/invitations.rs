use serde::Deserialize;

/// An invitation tracked by Wizarr.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InvitationRecord {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub expires: Option<String>,
}

impl InvitationRecord {
    #[must_use]
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_defaults_to_unknown() {
        let invitation: InvitationRecord =
            serde_json::from_value(json!({"code": "ABC123"})).expect("record should parse");
        assert_eq!(invitation.status_label(), "unknown");
        assert_eq!(invitation.code.as_deref(), Some("ABC123"));
    }
}
