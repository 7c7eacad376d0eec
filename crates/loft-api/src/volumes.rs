//! Persistent volume resource.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A persistent volume owned by an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    /// Volume name.
    #[serde(default)]
    pub name: String,
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Provisioned size, e.g. `500G`.
    #[serde(default)]
    pub size: String,
    /// Mount paths per process type.
    #[serde(default)]
    pub path: BTreeMap<String, String>,
    /// Volume type (csi, nfs, ...).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Driver parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// List volumes of an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Volume>, ApiError> {
    client.get_paged(&format!("apps/{app}/volumes/")).await
}

/// Fetch one volume.
pub async fn get(client: &mut Client, app: &str, name: &str) -> Result<Volume, ApiError> {
    client
        .get_json(&format!("apps/{app}/volumes/{name}/"))
        .await
        .map_err(|e| e.describe_not_found(format!("volume {name}")))
}

/// Provision a volume. `size` must already be validated (`^[1-9][0-9]*[gG]$`).
pub async fn create(
    client: &mut Client,
    app: &str,
    name: &str,
    size: &str,
) -> Result<Volume, ApiError> {
    client
        .post(
            &format!("apps/{app}/volumes/"),
            json!({ "name": name, "size": size }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("volume {name}")))?
        .json()
}

/// Grow a volume to a new size.
pub async fn expand(
    client: &mut Client,
    app: &str,
    name: &str,
    size: &str,
) -> Result<Volume, ApiError> {
    client
        .patch(&format!("apps/{app}/volumes/{name}/"), json!({ "size": size }))
        .await
        .map_err(|e| e.describe_not_found(format!("volume {name}")))?
        .json()
}

/// Delete a volume. Fails while the volume is mounted.
pub async fn delete(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/volumes/{name}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("volume {name}")))?;
    Ok(())
}

/// Mount the volume into process types; keys are ptypes, values paths.
/// A `null` path unmounts.
pub async fn patch_path(
    client: &mut Client,
    app: &str,
    name: &str,
    path: &BTreeMap<String, Value>,
) -> Result<Volume, ApiError> {
    client
        .patch(
            &format!("apps/{app}/volumes/{name}/path/"),
            json!({ "path": path }),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("volume {name}")))?
        .json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_renames_type_field() {
        let volume: Volume = serde_json::from_str(
            r#"{"name":"data","size":"500G","type":"csi","path":{"web":"/data"}}"#,
        )
        .expect("volume");
        assert_eq!(volume.kind, "csi");
        assert_eq!(volume.path.get("web").map(String::as_str), Some("/data"));
    }
}
