use serde::Deserialize;

/// An API key issued by Wizarr. A key with `deleted_at` set is expired.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiKeyRecord {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub deleted_at: Option<String>,
}

impl ApiKeyRecord {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
