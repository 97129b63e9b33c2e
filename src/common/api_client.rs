use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// The fixed set of Wizarr endpoints the bridge polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Status,
    Users,
    Invitations,
    Libraries,
    Servers,
    ApiKeys,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::Status,
        Endpoint::Users,
        Endpoint::Invitations,
        Endpoint::Libraries,
        Endpoint::Servers,
        Endpoint::ApiKeys,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Status => "/status",
            Endpoint::Users => "/users",
            Endpoint::Invitations => "/invitations",
            Endpoint::Libraries => "/libraries",
            Endpoint::Servers => "/servers",
            Endpoint::ApiKeys => "/api-keys",
        }
    }

    /// Stable identifier used in snapshot keys and log fields.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Endpoint::Status => "status",
            Endpoint::Users => "users",
            Endpoint::Invitations => "invitations",
            Endpoint::Libraries => "libraries",
            Endpoint::Servers => "servers",
            Endpoint::ApiKeys => "api_keys",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("cannot reach Wizarr at {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid API key (status {status} from {path})")]
    Auth { path: String, status: StatusCode },
    #[error("unexpected status {status} from {path}: {body}")]
    UnexpectedStatus {
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("malformed JSON from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Authenticated client for the Wizarr REST API. Cheap to clone; all clones
/// share one connection pool.
#[derive(Clone)]
pub struct WizarrClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl WizarrClient {
    /// Create the client.
    ///
    /// # Panics
    /// if it can't create the underlying HTTP client.
    #[must_use]
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiClientError> {
        let url = format!("{}/api{}", self.base_url, path);
        let mut request = self
            .http_client
            .request(method, &url)
            .header("X-API-Key", self.api_key.as_str());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ApiClientError::Connection {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            response
                .json()
                .await
                .map_err(|source| ApiClientError::Decode {
                    path: path.to_string(),
                    source,
                })
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ApiClientError::Auth {
                path: path.to_string(),
                status,
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiClientError::UnexpectedStatus {
                path: path.to_string(),
                status,
                body,
            })
        }
    }

    /// Fetch one of the polled endpoints.
    ///
    /// # Errors
    /// * If the request can't be made (connection or timeout).
    /// * If the API key is rejected.
    /// * If an unexpected status code is received.
    /// * If the body is not JSON.
    pub async fn get(&self, endpoint: Endpoint) -> Result<Value, ApiClientError> {
        self.request(Method::GET, endpoint.path(), None).await
    }

    /// POST a JSON body to one of the polled endpoints.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn post(&self, endpoint: Endpoint, body: &Value) -> Result<Value, ApiClientError> {
        self.request(Method::POST, endpoint.path(), Some(body)).await
    }

    /// Check that the base URL and API key work by fetching `/status` once.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn verify(&self) -> Result<(), ApiClientError> {
        self.get(Endpoint::Status).await.map(|_| ())
    }

    /// Create an invitation.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn create_invitation(&self, payload: &Value) -> Result<Value, ApiClientError> {
        self.post(Endpoint::Invitations, payload).await
    }

    /// Delete an invitation by ID.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn delete_invitation(&self, invitation_id: i64) -> Result<Value, ApiClientError> {
        self.request(Method::DELETE, &format!("/invitations/{invitation_id}"), None)
            .await
    }

    /// Delete a user by ID.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn delete_user(&self, user_id: i64) -> Result<Value, ApiClientError> {
        self.request(Method::DELETE, &format!("/users/{user_id}"), None)
            .await
    }

    /// Extend a user's expiry date.
    ///
    /// # Errors
    /// Same failure modes as [`WizarrClient::get`].
    pub async fn extend_user(
        &self,
        user_id: i64,
        extension: &Value,
    ) -> Result<Value, ApiClientError> {
        self.request(Method::POST, &format!("/users/{user_id}/extend"), Some(extension))
            .await
    }
}
