//! HTTP client wrapper for the Loft controller.
//!
//! One [`Client`] is built per command invocation from the stored profile.
//! It joins relative resource paths onto `<controller>/v2/`, attaches the
//! bearer token and user-agent, and records the API version the server
//! announces in the `LOFT_API_VERSION` response header.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ApiError;

/// API version this client is compiled against.
pub const API_VERSION: &str = "2.3";

/// Response header carrying the server's API version.
pub const VERSION_HEADER: &str = "LOFT_API_VERSION";

/// A response from the controller, body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(ApiError::Body)
    }
}

/// Session handle for one command invocation.
///
/// Not shared across threads; mutated as responses arrive so the latest
/// server-reported API version is always available.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    controller: Url,
    token: String,
    /// API version reported by the server; empty before the first response.
    pub api_version: String,
    /// Maximum number of results requested from paginated endpoints.
    pub response_limit: u64,
}

impl Client {
    /// Build a client for the given controller.
    ///
    /// `ssl_verify = false` allows self-signed controller certificates.
    pub fn new(
        controller: &str,
        token: impl Into<String>,
        ssl_verify: bool,
        response_limit: u64,
    ) -> Result<Self, ApiError> {
        let controller =
            Url::parse(controller).map_err(|e| ApiError::Url(format!("{controller}: {e}")))?;
        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .danger_accept_invalid_certs(!ssl_verify)
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            http,
            controller,
            token: token.into(),
            api_version: String::new(),
            response_limit,
        })
    }

    /// The controller base URL.
    #[must_use]
    pub fn controller(&self) -> &Url {
        &self.controller
    }

    /// Hostname of the controller, used to derive the builder git host.
    #[must_use]
    pub fn hostname(&self) -> String {
        self.controller.host_str().unwrap_or_default().to_string()
    }

    /// Whether the server's announced API version differs from the
    /// compiled-in [`API_VERSION`]. False before any response.
    #[must_use]
    pub fn version_mismatch(&self) -> bool {
        !self.api_version.is_empty() && self.api_version != API_VERSION
    }

    /// Perform a request against a path relative to `/v2/`.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let response = self.send(method, path, body).await?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;
        classify(status, text, path)
    }

    /// Perform a GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await?.json()
    }

    /// GET a paginated listing, honouring the configured response limit.
    pub async fn get_paged<T: DeserializeOwned>(&mut self, path: &str) -> Result<T, ApiError> {
        let sep = if path.contains('?') { '&' } else { '?' };
        let path = format!("{path}{sep}limit={}", self.response_limit);
        self.get_json(&path).await
    }

    /// POST a JSON body.
    pub async fn post(&mut self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PATCH a JSON body.
    pub async fn patch(&mut self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, optionally with a JSON body.
    pub async fn delete(&mut self, path: &str, body: Option<Value>) -> Result<ApiResponse, ApiError> {
        self.request(Method::DELETE, path, body).await
    }

    /// Perform a GET and hand back the raw response for streaming
    /// consumption (log following). The status is classified and the
    /// version header recorded before the body is touched.
    pub async fn get_stream(&mut self, path: &str) -> Result<reqwest::Response, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        match classify(status, text, path) {
            Err(e) => Err(e),
            // Unreachable: classify only succeeds for 2xx.
            Ok(r) => Err(ApiError::Server { status: r.status }),
        }
    }

    async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = join_v2(&self.controller, path);
        debug!(%method, %url, "controller request");
        let mut request = self.http.request(method, &url);
        if !self.token.is_empty() {
            request = request.header("Authorization", format!("token {}", self.token));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(ApiError::Network)?;
        if let Some(version) = response
            .headers()
            .get(VERSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.api_version = version.to_string();
        }
        Ok(response)
    }
}

/// Join a resource path onto the controller's `/v2/` prefix.
fn join_v2(controller: &Url, path: &str) -> String {
    format!(
        "{}/v2/{}",
        controller.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// User-agent announced on every request.
#[must_use]
pub fn user_agent() -> String {
    format!("Loft Client v{}", env!("CARGO_PKG_VERSION"))
}

fn classify(status: StatusCode, body: String, path: &str) -> Result<ApiResponse, ApiError> {
    if status.is_success() {
        return Ok(ApiResponse { status: status.as_u16(), body });
    }
    let what = path.split('?').next().unwrap_or(path).to_string();
    match status.as_u16() {
        404 => Err(ApiError::NotFound { what }),
        409 => Err(ApiError::Conflict { what }),
        400..=499 => Err(ApiError::Client { status: status.as_u16(), body }),
        _ => Err(ApiError::Server { status: status.as_u16() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_v2_handles_leading_and_trailing_slashes() {
        let base = Url::parse("http://loft.example.com").expect("url");
        assert_eq!(join_v2(&base, "apps/"), "http://loft.example.com/v2/apps/");
        assert_eq!(join_v2(&base, "/apps/"), "http://loft.example.com/v2/apps/");
    }

    #[test]
    fn join_v2_keeps_query_strings() {
        let base = Url::parse("https://loft.example.com/").expect("url");
        assert_eq!(
            join_v2(&base, "apps/?limit=10"),
            "https://loft.example.com/v2/apps/?limit=10"
        );
    }

    #[test]
    fn user_agent_carries_crate_version() {
        assert!(user_agent().starts_with("Loft Client v"));
    }

    #[test]
    fn classify_maps_status_families() {
        assert!(classify(StatusCode::OK, String::new(), "apps/").is_ok());
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, String::new(), "apps/x/?a=1"),
            Err(ApiError::NotFound { what }) if what == "apps/x/"
        ));
        assert!(matches!(
            classify(StatusCode::CONFLICT, String::new(), "apps/"),
            Err(ApiError::Conflict { .. })
        ));
        assert!(matches!(
            classify(StatusCode::BAD_REQUEST, "nope".into(), "apps/"),
            Err(ApiError::Client { status: 400, body }) if body == "nope"
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, String::new(), "apps/"),
            Err(ApiError::Server { status: 502 })
        ));
    }

    #[test]
    fn new_client_rejects_bad_urls() {
        assert!(Client::new("not a url", "", true, 100).is_err());
    }

    #[test]
    fn fresh_client_has_no_version_mismatch() {
        let client = Client::new("http://h", "t", true, 100).expect("client");
        assert!(!client.version_mismatch());
        assert!(client.api_version.is_empty());
    }

    #[test]
    fn hostname_extraction() {
        let client = Client::new("https://loft.example.com:8443", "t", true, 100).expect("client");
        assert_eq!(client.hostname(), "loft.example.com");
    }
}
