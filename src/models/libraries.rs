use serde::Deserialize;

/// A media library exposed by one of the connected servers.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibraryRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub server_id: Option<i64>,
    pub server_name: Option<String>,
}

impl LibraryRecord {
    #[must_use]
    pub fn server_label(&self) -> &str {
        self.server_name.as_deref().unwrap_or("unknown")
    }
}
