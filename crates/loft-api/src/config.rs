//! Configuration resource: environment variables, limits, tags, registry
//! credentials, healthchecks and termination grace periods all live on the
//! per-app config document and are updated with partial POSTs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;

/// The per-app configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// User who produced this revision.
    #[serde(default)]
    pub owner: String,
    /// Server-assigned UUID.
    #[serde(default)]
    pub uuid: String,
    /// App-wide environment variables.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Per-process-type environment variables, keyed by ptype.
    #[serde(default)]
    pub typed_values: BTreeMap<String, BTreeMap<String, String>>,
    /// Per-process-type limit plan ids.
    #[serde(default)]
    pub limits: BTreeMap<String, String>,
    /// Scheduling tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Private registry credentials per process type.
    #[serde(default)]
    pub registry: BTreeMap<String, BTreeMap<String, String>>,
    /// Health probes per process type.
    #[serde(default)]
    pub healthcheck: BTreeMap<String, Healthchecks>,
    /// Termination grace periods (seconds) per process type.
    #[serde(default)]
    pub termination_grace_period: BTreeMap<String, u64>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// The three probe kinds attachable to a process type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Healthchecks {
    /// Probe gating the first readiness check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup: Option<Probe>,
    /// Probe that restarts the container on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness: Option<Probe>,
    /// Probe that removes the container from routing on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness: Option<Probe>,
}

/// A single health probe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    /// Seconds to wait before the first check.
    #[serde(default)]
    pub initial_delay_seconds: u32,
    /// Seconds between checks.
    #[serde(default)]
    pub period_seconds: u32,
    /// Seconds before a single check times out.
    #[serde(default)]
    pub timeout_seconds: u32,
    /// Consecutive successes required after a failure.
    #[serde(default)]
    pub success_threshold: u32,
    /// Consecutive failures required to act.
    #[serde(default)]
    pub failure_threshold: u32,
    /// HTTP GET probe parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetProbe>,
    /// Command probe parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecProbe>,
    /// TCP connect probe parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TcpSocketProbe>,
}

/// HTTP GET probe parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetProbe {
    /// Request path.
    #[serde(default)]
    pub path: String,
    /// Target port.
    #[serde(default)]
    pub port: u16,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http_headers: Vec<crate::types::KvPair>,
}

/// Command probe parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecProbe {
    /// Command and arguments run inside the container.
    #[serde(default)]
    pub command: Vec<String>,
}

/// TCP connect probe parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TcpSocketProbe {
    /// Target port.
    #[serde(default)]
    pub port: u16,
}

/// Fetch the current config document.
pub async fn get(client: &mut Client, app: &str) -> Result<Config, ApiError> {
    client
        .get_json(&format!("apps/{app}/config/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Apply a partial update; `null` values unset keys. Returns the new
/// config revision.
pub async fn set(client: &mut Client, app: &str, body: Value) -> Result<Config, ApiError> {
    client
        .post(&format!("apps/{app}/config/"), body)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))?
        .json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_uses_camel_case_wire_names() {
        let probe: Probe = serde_json::from_str(
            r#"{"initialDelaySeconds":5,"httpGet":{"path":"/healthz","port":8080}}"#,
        )
        .expect("probe");
        assert_eq!(probe.initial_delay_seconds, 5);
        let http = probe.http_get.expect("httpGet");
        assert_eq!(http.path, "/healthz");
        assert_eq!(http.port, 8080);
    }

    #[test]
    fn config_defaults_to_empty_maps() {
        let config: Config = serde_json::from_str(r#"{"app":"a"}"#).expect("config");
        assert!(config.values.is_empty());
        assert!(config.healthcheck.is_empty());
    }

    #[test]
    fn healthchecks_skip_absent_probes_on_serialize() {
        let checks = Healthchecks {
            startup: None,
            liveness: Some(Probe::default()),
            readiness: None,
        };
        let value = serde_json::to_value(&checks).expect("value");
        assert!(value.get("startup").is_none());
        assert!(value.get("liveness").is_some());
    }
}
