//! Application resource.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// An application on the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    /// Server-assigned UUID.
    #[serde(default)]
    pub uuid: String,
    /// Application slug.
    #[serde(default)]
    pub id: String,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// Public URL, when routable.
    #[serde(default)]
    pub url: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// Result of an ephemeral `apps:run` command.
#[derive(Debug, Clone, Deserialize)]
pub struct RunResult {
    /// Exit code of the command.
    #[serde(default)]
    pub exit_code: i32,
    /// Combined stdout/stderr output.
    #[serde(default)]
    pub output: String,
}

/// List applications visible to the session.
pub async fn list(client: &mut Client) -> Result<Paged<App>, ApiError> {
    client.get_paged("apps/").await
}

/// Create an application; the controller picks a name when `id` is `None`.
pub async fn create(client: &mut Client, id: Option<&str>) -> Result<App, ApiError> {
    let body = match id {
        Some(id) => json!({ "id": id }),
        None => json!({}),
    };
    client
        .post("apps/", body)
        .await
        .map_err(|e| e.describe_conflict(format!("app {}", id.unwrap_or("<generated>"))))?
        .json()
}

/// Fetch one application.
pub async fn get(client: &mut Client, id: &str) -> Result<App, ApiError> {
    client
        .get_json(&format!("apps/{id}/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {id}")))
}

/// Destroy an application and everything attached to it.
pub async fn destroy(client: &mut Client, id: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{id}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("app {id}")))?;
    Ok(())
}

/// Transfer ownership to another user.
pub async fn transfer(client: &mut Client, id: &str, owner: &str) -> Result<(), ApiError> {
    client
        .post(&format!("apps/{id}/"), json!({ "owner": owner }))
        .await?;
    Ok(())
}

/// Open a log stream; the response body yields raw log lines.
pub async fn logs(
    client: &mut Client,
    id: &str,
    lines: i64,
    follow: bool,
    timeout: u64,
) -> Result<reqwest::Response, ApiError> {
    let path =
        format!("apps/{id}/logs/?log_lines={lines}&follow={follow}&timeout={timeout}");
    client
        .get_stream(&path)
        .await
        .map_err(|e| e.describe_not_found(format!("logs for app {id}")))
}

/// Run an ephemeral command inside the app image.
pub async fn run(
    client: &mut Client,
    id: &str,
    command: &str,
    timeout: u64,
    expires: u64,
    mounts: &BTreeMap<String, String>,
) -> Result<RunResult, ApiError> {
    let mut body = json!({
        "command": command,
        "timeout": timeout,
        "expires": expires,
    });
    if !mounts.is_empty() {
        body["volumes"] = json!(mounts);
    }
    client.post(&format!("apps/{id}/run/"), body).await?.json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_deserializes_with_missing_fields() {
        let app: App = serde_json::from_str(r#"{"id":"lorem-ipsum"}"#).expect("app");
        assert_eq!(app.id, "lorem-ipsum");
        assert!(app.owner.is_empty());
    }

    #[test]
    fn run_result_defaults() {
        let run: RunResult = serde_json::from_str(r#"{"output":"hi\n"}"#).expect("run");
        assert_eq!(run.exit_code, 0);
        assert_eq!(run.output, "hi\n");
    }
}
