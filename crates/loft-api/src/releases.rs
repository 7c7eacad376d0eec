//! Release resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A release: an immutable (build, config, settings) tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Server-assigned UUID.
    #[serde(default)]
    pub uuid: String,
    /// Monotonic version number.
    #[serde(default)]
    pub version: u64,
    /// Human-readable change summary.
    #[serde(default)]
    pub summary: String,
    /// Deploy state (`succeed`, `crashed`, ...).
    #[serde(default)]
    pub state: String,
    /// Failure detail, when the deploy went wrong.
    #[serde(default)]
    pub exception: String,
    /// Deploying user.
    #[serde(default)]
    pub owner: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

#[derive(Debug, Deserialize)]
struct RollbackResponse {
    #[serde(default)]
    version: u64,
}

/// List releases, newest first.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Release>, ApiError> {
    client
        .get_paged(&format!("apps/{app}/releases/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Fetch one release by version number.
pub async fn get(client: &mut Client, app: &str, version: u64) -> Result<Release, ApiError> {
    client
        .get_json(&format!("apps/{app}/releases/v{version}/"))
        .await
        .map_err(|e| e.describe_not_found(format!("release v{version} in app {app}")))
}

/// Redeploy the current release, optionally only some process types.
pub async fn deploy(
    client: &mut Client,
    app: &str,
    ptypes: &[String],
    force: bool,
) -> Result<(), ApiError> {
    let mut body = json!({ "force": force });
    if !ptypes.is_empty() {
        body["ptypes"] = json!(ptypes.join(","));
    }
    client
        .post(&format!("apps/{app}/deploy/"), body)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))?;
    Ok(())
}

/// Roll back to `version`, or to the previous release when `None`.
/// Returns the version of the new release the rollback produced.
pub async fn rollback(
    client: &mut Client,
    app: &str,
    version: Option<u64>,
) -> Result<u64, ApiError> {
    let body = match version {
        Some(version) => json!({ "version": version }),
        None => json!({}),
    };
    let response: RollbackResponse = client
        .post(&format!("apps/{app}/releases/rollback/"), body)
        .await
        .map_err(|e| match version {
            Some(v) => e.describe_not_found(format!("release v{v} in app {app}")),
            None => e.describe_not_found(format!("app {app}")),
        })?
        .json()?;
    Ok(response.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_deserializes_version() {
        let release: Release =
            serde_json::from_str(r#"{"app":"a","version":7,"summary":"ada deployed 3f1b"}"#)
                .expect("release");
        assert_eq!(release.version, 7);
    }

    #[test]
    fn rollback_response_extracts_new_version() {
        let response: RollbackResponse =
            serde_json::from_str(r#"{"version":5}"#).expect("rollback");
        assert_eq!(response.version, 5);
    }
}
