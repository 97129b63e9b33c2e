use serde::Deserialize;

/// A media-server user known to Wizarr.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserRecord {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub server_type: Option<String>,
    pub expires: Option<String>,
}

impl UserRecord {
    #[must_use]
    pub fn server_type_label(&self) -> &str {
        self.server_type.as_deref().unwrap_or("unknown")
    }
}
