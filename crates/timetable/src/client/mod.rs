//! HTTP client for the timetable backend.
//!
//! Every call takes the caller's [`AuthContext`]; when it holds a session the
//! token is attached as a bearer header. Writes are validated and role
//! checked locally before a request is built. Failed responses surface the
//! backend's `message` when the body has one, otherwise the per-operation
//! fallback text.

mod auth;
mod error;
mod export;
mod people;
mod timetables;

pub use auth::{Registration, REGISTERED_MESSAGE};
pub use error::ApiError;
pub use export::{ExportFormat, ExportTarget, ExportedDocument};
pub use people::ProfilePhoto;

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::types::Role;
use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Body shape the backend uses for errors and plain acknowledgements.
#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

/// Extracts a non-empty `message` field from a JSON body.
fn backend_message(body: &str) -> Option<String> {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// Client for the timetable REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client from configuration.
    ///
    /// # Arguments
    /// * `config` - Base URL, timeouts and user agent
    ///
    /// # Returns
    /// * `Ok(ApiClient)` - Ready to issue requests
    /// * `Err(ApiError)` - If the base URL is invalid or the HTTP client
    ///   can't be built
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::UrlError {
                message: format!("{} cannot be used as a base URL", config.api_url),
            });
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::UrlError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, auth: &AuthContext, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match auth.bearer_token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Sends a request and turns non-success statuses into [`ApiError::Backend`].
    async fn dispatch(
        &self,
        builder: RequestBuilder,
        method: &Method,
        url: &Url,
        fallback: &str,
    ) -> Result<Response, ApiError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();

        info!(
            correlation_id = %correlation_id,
            method = %method,
            path = url.path(),
            "Sending backend request"
        );

        let response = builder.send().await.map_err(|e| {
            error!(
                correlation_id = %correlation_id,
                error = %e,
                "Backend request failed"
            );
            ApiError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(
                correlation_id = %correlation_id,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Backend request succeeded"
            );
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = backend_message(&body).unwrap_or_else(|| fallback.to_string());
        warn!(
            correlation_id = %correlation_id,
            status = status.as_u16(),
            message = %message,
            duration_ms = start.elapsed().as_millis() as u64,
            "Backend rejected request"
        );
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    /// GET returning a JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        auth: &AuthContext,
        segments: &[&str],
        query: &[(&str, &str)],
        fallback: &str,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.request(auth, Method::GET, url.clone()).query(query);
        let response = self.dispatch(builder, &Method::GET, &url, fallback).await?;
        read_json(response).await
    }

    /// Sends a JSON body and returns the raw response.
    async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        auth: &AuthContext,
        method: Method,
        segments: &[&str],
        body: &B,
        fallback: &str,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.request(auth, method.clone(), url.clone()).json(body);
        self.dispatch(builder, &method, &url, fallback).await
    }

    /// Sends a request without a body and discards the response.
    async fn send_empty(
        &self,
        auth: &AuthContext,
        method: Method,
        segments: &[&str],
        fallback: &str,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        let builder = self.request(auth, method.clone(), url.clone());
        self.dispatch(builder, &method, &url, fallback).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::UnexpectedResponse {
        message: format!("Failed to decode response body: {}", e),
    })
}

/// Reads an acknowledgement body, preferring its `message` over `default`.
async fn read_message(response: Response, default: &str) -> String {
    let body = response.text().await.unwrap_or_default();
    backend_message(&body).unwrap_or_else(|| default.to_string())
}

/// Checks that the context holds a session whose role passes `allowed`.
fn require_role(auth: &AuthContext, allowed: impl Fn(&Role) -> bool) -> Result<(), ApiError> {
    match auth.role() {
        None => Err(ApiError::NoSession {
            message: "log in to continue".to_string(),
        }),
        Some(role) if allowed(&role) => Ok(()),
        Some(role) => {
            warn!(role = %role, "Rejected action for role");
            Err(ApiError::Forbidden)
        }
    }
}

fn require_session(auth: &AuthContext) -> Result<(), ApiError> {
    require_role(auth, |_| true)
}

/// Generates a short correlation ID for tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::types::User;

    fn client(api_url: &str) -> ApiClient {
        let config = ClientConfig {
            api_url: api_url.to_string(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    fn auth_as(role: Role) -> AuthContext {
        AuthContext::with_session(Session {
            token: "t".to_string(),
            user: User {
                id: None,
                username: "x".to_string(),
                email: "x@college.edu".to_string(),
                role,
            },
        })
    }

    #[test]
    fn test_endpoint_with_and_without_trailing_slash() {
        for base in ["http://localhost:5000/api", "http://localhost:5000/api/"] {
            let url = client(base).endpoint(&["timetables", "42"]).unwrap();
            assert_eq!(url.as_str(), "http://localhost:5000/api/timetables/42");
        }
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = client("http://localhost:5000/api")
            .endpoint(&["auth", "verify-email", "a/b c"])
            .unwrap();
        assert_eq!(url.path(), "/api/auth/verify-email/a%2Fb%20c");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = ClientConfig {
            api_url: "mailto:admin@college.edu".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            ApiClient::new(&config),
            Err(ApiError::UrlError { .. })
        ));
    }

    #[test]
    fn test_backend_message_extraction() {
        assert_eq!(
            backend_message(r#"{"message":"Slot taken"}"#),
            Some("Slot taken".to_string())
        );
        assert_eq!(backend_message(r#"{"message":"  "}"#), None);
        assert_eq!(backend_message("<html>502</html>"), None);
        assert_eq!(backend_message(r#"{"error":"x"}"#), None);
    }

    #[test]
    fn test_require_role() {
        assert!(matches!(
            require_role(&AuthContext::anonymous(), |_| true),
            Err(ApiError::NoSession { .. })
        ));
        assert!(matches!(
            require_role(&auth_as(Role::Student), Role::can_edit_timetable),
            Err(ApiError::Forbidden)
        ));
        assert!(require_role(&auth_as(Role::Hod), Role::can_edit_timetable).is_ok());
    }

    #[test]
    fn test_correlation_id_shape() {
        let id = generate_correlation_id();
        let (_, random) = id.split_once('-').unwrap();
        assert_eq!(random.len(), 8);
    }
}
