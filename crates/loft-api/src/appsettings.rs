//! Per-app settings: maintenance, routability, auto-deploy/rollback,
//! canaries, labels, autoscale policies and TLS configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;

/// The settings document attached to every app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Maintenance mode: all routing suspended.
    #[serde(default)]
    pub maintenance: Option<bool>,
    /// Whether the router exposes the app at all.
    #[serde(default)]
    pub routable: Option<bool>,
    /// Deploy automatically after each successful build.
    #[serde(default)]
    pub autodeploy: Option<bool>,
    /// Roll back automatically when a deploy fails.
    #[serde(default)]
    pub autorollback: Option<bool>,
    /// Free-form labels shown by `apps:info`.
    #[serde(default)]
    pub label: BTreeMap<String, Value>,
    /// Process types deployed as canaries.
    #[serde(default)]
    pub canaries: Vec<String>,
    /// Autoscale policy per process type.
    #[serde(default)]
    pub autoscale: BTreeMap<String, AutoscalePolicy>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// A CPU-driven horizontal autoscale policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoscalePolicy {
    /// Replica floor.
    pub min: u32,
    /// Replica ceiling.
    pub max: u32,
    /// Target CPU utilisation percentage.
    pub cpu_percent: u32,
}

/// TLS settings for an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsSetting {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Redirect HTTP to HTTPS.
    #[serde(default)]
    pub https_enforced: Option<bool>,
    /// Issue certificates automatically via ACME.
    #[serde(default)]
    pub certs_auto_enabled: Option<bool>,
    /// ACME issuer, when auto-issuing.
    #[serde(default)]
    pub issuer: Option<Issuer>,
}

/// An ACME issuer account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issuer {
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// ACME directory URL.
    #[serde(default)]
    pub server: String,
    /// External account binding key id.
    #[serde(default)]
    pub key_id: String,
    /// External account binding secret.
    #[serde(default)]
    pub key_secret: String,
}

/// Fetch the settings document.
pub async fn get(client: &mut Client, app: &str) -> Result<AppSettings, ApiError> {
    client
        .get_json(&format!("apps/{app}/settings/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Apply a partial settings update.
pub async fn set(client: &mut Client, app: &str, body: Value) -> Result<AppSettings, ApiError> {
    client
        .post(&format!("apps/{app}/settings/"), body)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))?
        .json()
}

/// Set or replace the autoscale policy for one process type.
pub async fn autoscale_set(
    client: &mut Client,
    app: &str,
    ptype: &str,
    policy: AutoscalePolicy,
) -> Result<(), ApiError> {
    set(client, app, json!({ "autoscale": { ptype: policy } })).await?;
    Ok(())
}

/// Remove the autoscale policy for one process type.
pub async fn autoscale_unset(client: &mut Client, app: &str, ptype: &str) -> Result<(), ApiError> {
    set(client, app, json!({ "autoscale": { ptype: Value::Null } })).await?;
    Ok(())
}

/// Fetch TLS settings.
pub async fn tls_get(client: &mut Client, app: &str) -> Result<TlsSetting, ApiError> {
    client
        .get_json(&format!("apps/{app}/tls/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Apply a partial TLS settings update.
pub async fn tls_set(client: &mut Client, app: &str, body: Value) -> Result<TlsSetting, ApiError> {
    client
        .post(&format!("apps/{app}/tls/"), body)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))?
        .json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_toggles_are_tri_state() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"app":"a","maintenance":true}"#).expect("settings");
        assert_eq!(settings.maintenance, Some(true));
        assert_eq!(settings.routable, None);
    }

    #[test]
    fn autoscale_policy_round_trips() {
        let policy = AutoscalePolicy { min: 2, max: 8, cpu_percent: 75 };
        let text = serde_json::to_string(&policy).expect("json");
        let back: AutoscalePolicy = serde_json::from_str(&text).expect("policy");
        assert_eq!(back, policy);
    }
}
