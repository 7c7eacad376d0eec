//! Route resource (Gateway-API style routing rules).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A route owned by an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Route name.
    #[serde(default)]
    pub name: String,
    /// Route kind (`HTTPRoute`, `TCPRoute`, ...).
    #[serde(default)]
    pub kind: String,
    /// Gateways the route is attached to.
    #[serde(default)]
    pub parent_refs: Vec<ParentRef>,
    /// Raw routing rules.
    #[serde(default)]
    pub rules: Value,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
}

/// A gateway attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    /// Gateway name.
    #[serde(default)]
    pub name: String,
    /// Listener port on the gateway.
    #[serde(default)]
    pub port: u16,
}

/// List routes for an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Route>, ApiError> {
    client.get_paged(&format!("apps/{app}/routes/")).await
}

/// Create a route pointing at a ptype/port backend.
pub async fn add(
    client: &mut Client,
    app: &str,
    name: &str,
    kind: &str,
    ptype: &str,
    port: u16,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/routes/"),
            json!({ "name": name, "kind": kind, "ptype": ptype, "port": port }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("route {name}")))?;
    Ok(())
}

/// Fetch the raw rules document for a route.
pub async fn get_rules(client: &mut Client, app: &str, name: &str) -> Result<Value, ApiError> {
    client
        .get_json(&format!("apps/{app}/routes/{name}/rules/"))
        .await
        .map_err(|e| e.describe_not_found(format!("route {name}")))
}

/// Replace the rules document for a route.
pub async fn set_rules(
    client: &mut Client,
    app: &str,
    name: &str,
    rules: Value,
) -> Result<(), ApiError> {
    client
        .request(reqwest::Method::PUT, &format!("apps/{app}/routes/{name}/rules/"), Some(rules))
        .await
        .map_err(|e| e.describe_not_found(format!("route {name}")))?;
    Ok(())
}

/// Attach a route to a gateway listener port.
pub async fn attach(
    client: &mut Client,
    app: &str,
    name: &str,
    gateway: &str,
    port: u16,
) -> Result<(), ApiError> {
    client
        .patch(
            &format!("apps/{app}/routes/{name}/attach/"),
            json!({ "gateway": gateway, "port": port }),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("route {name} or gateway {gateway}")))?;
    Ok(())
}

/// Detach a route from a gateway listener port.
pub async fn detach(
    client: &mut Client,
    app: &str,
    name: &str,
    gateway: &str,
    port: u16,
) -> Result<(), ApiError> {
    client
        .patch(
            &format!("apps/{app}/routes/{name}/detach/"),
            json!({ "gateway": gateway, "port": port }),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("route {name} or gateway {gateway}")))?;
    Ok(())
}

/// Delete a route.
pub async fn remove(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/routes/{name}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("route {name}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_keeps_rules_opaque() {
        let route: Route = serde_json::from_str(
            r#"{"name":"web-route","kind":"HTTPRoute",
                "parent_refs":[{"name":"main","port":80}],
                "rules":[{"backendRefs":[{"name":"web","port":80}]}]}"#,
        )
        .expect("route");
        assert_eq!(route.parent_refs[0].name, "main");
        assert!(route.rules.is_array());
    }
}
