//! Processes (pods) and process types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A running process of an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// Process name (pod name).
    #[serde(default)]
    pub name: String,
    /// Release the process runs.
    #[serde(default)]
    pub release: String,
    /// Lifecycle state (`up`, `down`, `crashed`, ...).
    #[serde(default)]
    pub state: String,
    /// Process type.
    #[serde(default)]
    pub ptype: String,
    /// Start timestamp.
    #[serde(default)]
    pub started: String,
}

/// An event attached to a process, surfaced by `ps:describe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessEvent {
    /// Event reason.
    #[serde(default)]
    pub reason: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Event timestamp.
    #[serde(default)]
    pub created: String,
}

/// A process type (deployment) of an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ptype {
    /// Process type name.
    #[serde(default)]
    pub name: String,
    /// Release currently deployed.
    #[serde(default)]
    pub release: String,
    /// Ready replicas over desired, e.g. `2/2`.
    #[serde(default)]
    pub ready: String,
    /// Replicas running the latest release.
    #[serde(default)]
    pub up_to_date: u32,
    /// Replicas available to serve traffic.
    #[serde(default)]
    pub available: u32,
    /// Rollout start timestamp.
    #[serde(default)]
    pub started: String,
    /// Garbage-collectable (scaled to zero and idle).
    #[serde(default)]
    pub garbage: bool,
}

/// List processes, optionally filtered to one ptype.
pub async fn list(
    client: &mut Client,
    app: &str,
    ptype: Option<&str>,
) -> Result<Paged<Process>, ApiError> {
    let path = match ptype {
        Some(ptype) => format!("apps/{app}/pods/?ptype={ptype}"),
        None => format!("apps/{app}/pods/"),
    };
    client
        .get_paged(&path)
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Fetch events for one process.
pub async fn describe(
    client: &mut Client,
    app: &str,
    name: &str,
) -> Result<Paged<ProcessEvent>, ApiError> {
    client
        .get_paged(&format!("apps/{app}/pods/{name}/describe/"))
        .await
        .map_err(|e| e.describe_not_found(format!("process {name} in app {app}")))
}

/// Scale process types to the given counts.
pub async fn scale(
    client: &mut Client,
    app: &str,
    targets: &BTreeMap<String, u32>,
) -> Result<(), ApiError> {
    client
        .post(&format!("apps/{app}/scale/"), json!(targets))
        .await
        .map_err(|e| {
            let types = targets.keys().cloned().collect::<Vec<_>>().join(", ");
            e.describe_not_found(format!("process type {types} in app {app}"))
        })?;
    Ok(())
}

/// Restart processes: a whole ptype, or named processes.
pub async fn restart(
    client: &mut Client,
    app: &str,
    ptypes: &[String],
    names: &[String],
) -> Result<(), ApiError> {
    let mut body = json!({});
    if !ptypes.is_empty() {
        body["ptypes"] = json!(ptypes.join(","));
    }
    if !names.is_empty() {
        body["pod_ids"] = json!(names.join(","));
    }
    client
        .post(&format!("apps/{app}/pods/restart/"), body)
        .await
        .map_err(|e| {
            e.describe_not_found(format!(
                "process type {} in app {app}",
                ptypes.join(", ")
            ))
        })?;
    Ok(())
}

/// List process types.
pub async fn ptypes(client: &mut Client, app: &str) -> Result<Paged<Ptype>, ApiError> {
    client
        .get_paged(&format!("apps/{app}/ptypes/"))
        .await
        .map_err(|e| e.describe_not_found(format!("app {app}")))
}

/// Fetch the deployed spec of one process type.
pub async fn ptype_describe(
    client: &mut Client,
    app: &str,
    ptype: &str,
) -> Result<Value, ApiError> {
    client
        .get_json(&format!("apps/{app}/ptypes/{ptype}/describe/"))
        .await
        .map_err(|e| e.describe_not_found(format!("process type {ptype} in app {app}")))
}

/// Start (scale up from zero) the given process types.
pub async fn start(client: &mut Client, app: &str, ptypes: &[String]) -> Result<(), ApiError> {
    ptype_action(client, app, "start", ptypes).await
}

/// Stop (scale to zero) the given process types.
pub async fn stop(client: &mut Client, app: &str, ptypes: &[String]) -> Result<(), ApiError> {
    ptype_action(client, app, "stop", ptypes).await
}

/// Remove process types that are scaled to zero and unreferenced.
pub async fn clean(client: &mut Client, app: &str, ptypes: &[String]) -> Result<(), ApiError> {
    ptype_action(client, app, "clean", ptypes).await
}

async fn ptype_action(
    client: &mut Client,
    app: &str,
    action: &str,
    ptypes: &[String],
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/ptypes/{action}/"),
            json!({ "ptypes": ptypes.join(",") }),
        )
        .await
        .map_err(|e| {
            e.describe_not_found(format!(
                "process type {} in app {app}",
                ptypes.join(", ")
            ))
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_deserializes() {
        let process: Process = serde_json::from_str(
            r#"{"name":"web-abc123","release":"v4","state":"up","ptype":"web"}"#,
        )
        .expect("process");
        assert_eq!(process.state, "up");
    }

    #[test]
    fn ptype_ready_is_a_string_fraction() {
        let ptype: Ptype =
            serde_json::from_str(r#"{"name":"web","ready":"2/2","up_to_date":2,"available":2}"#)
                .expect("ptype");
        assert_eq!(ptype.ready, "2/2");
    }
}
