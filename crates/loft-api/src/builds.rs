//! Build resource: images submitted to produce releases.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A build record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Build {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Server-assigned UUID.
    #[serde(default)]
    pub uuid: String,
    /// Submitting user.
    #[serde(default)]
    pub owner: String,
    /// Container image reference.
    #[serde(default)]
    pub image: String,
    /// Stack the image targets.
    #[serde(default)]
    pub stack: String,
    /// Git SHA, when pushed from source.
    #[serde(default)]
    pub sha: String,
    /// Process types declared by the Procfile.
    #[serde(default)]
    pub procfile: BTreeMap<String, String>,
    /// Structured deploy manifest (`loft.yaml`), if any.
    #[serde(default)]
    pub loftfile: Value,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// List builds for an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Build>, ApiError> {
    client.get_paged(&format!("apps/{app}/build/")).await
}

/// Submit a new build from an image, with optional process definitions.
pub async fn create(
    client: &mut Client,
    app: &str,
    image: &str,
    stack: Option<&str>,
    procfile: Option<&BTreeMap<String, String>>,
    loftfile: Option<&Value>,
) -> Result<(), ApiError> {
    let mut body = json!({ "image": image });
    if let Some(stack) = stack {
        body["stack"] = json!(stack);
    }
    if let Some(procfile) = procfile {
        body["procfile"] = json!(procfile);
    }
    if let Some(loftfile) = loftfile {
        body["loftfile"] = loftfile.clone();
    }
    client
        .post(&format!("apps/{app}/build/"), body)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_deserializes_procfile_map() {
        let build: Build = serde_json::from_str(
            r#"{"app":"a","image":"registry/img:v1","procfile":{"web":"./serve"}}"#,
        )
        .expect("build");
        assert_eq!(build.procfile.get("web").map(String::as_str), Some("./serve"));
    }
}
