//! Provisioned backing services (databases, caches) bound to apps.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A provisioned resource instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// `<service>:<plan>` the instance was created from.
    #[serde(default)]
    pub plan: String,
    /// Provisioning status.
    #[serde(default)]
    pub status: String,
    /// Binding status.
    #[serde(default)]
    pub binding: String,
    /// Connection data exposed to the app.
    #[serde(default)]
    pub data: BTreeMap<String, serde_json::Value>,
    /// Provisioning options.
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// A service offered by the resource broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerService {
    /// Service id.
    #[serde(default)]
    pub id: String,
    /// Service name.
    #[serde(default)]
    pub name: String,
    /// Whether instances can change plans in place.
    #[serde(default)]
    pub updateable: bool,
}

/// A plan within a broker service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerPlan {
    /// Plan id.
    #[serde(default)]
    pub id: String,
    /// Plan name.
    #[serde(default)]
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// List services the broker offers.
pub async fn services(client: &mut Client) -> Result<Paged<BrokerService>, ApiError> {
    client.get_paged("resources/services/").await
}

/// List plans of one broker service.
pub async fn plans(client: &mut Client, service: &str) -> Result<Paged<BrokerPlan>, ApiError> {
    client
        .get_paged(&format!("resources/services/{service}/plans/"))
        .await
        .map_err(|e| e.describe_not_found(format!("service {service}")))
}

/// List resource instances of an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Resource>, ApiError> {
    client.get_paged(&format!("apps/{app}/resources/")).await
}

/// Provision a new instance from `<service>:<plan>`.
pub async fn create(
    client: &mut Client,
    app: &str,
    name: &str,
    plan: &str,
    options: &BTreeMap<String, String>,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/resources/"),
            json!({ "name": name, "plan": plan, "options": options }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("resource {name}")))?;
    Ok(())
}

/// Fetch one instance.
pub async fn get(client: &mut Client, app: &str, name: &str) -> Result<Resource, ApiError> {
    client
        .get_json(&format!("apps/{app}/resources/{name}/"))
        .await
        .map_err(|e| e.describe_not_found(format!("resource {name}")))
}

/// Change an instance's plan or options.
pub async fn update(
    client: &mut Client,
    app: &str,
    name: &str,
    plan: &str,
    options: &BTreeMap<String, String>,
) -> Result<(), ApiError> {
    client
        .request(
            reqwest::Method::PUT,
            &format!("apps/{app}/resources/{name}/"),
            Some(json!({ "plan": plan, "options": options })),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("resource {name}")))?;
    Ok(())
}

/// Deprovision an instance.
pub async fn destroy(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/resources/{name}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("resource {name}")))?;
    Ok(())
}

/// Bind an instance to the app (exposes its connection data).
pub async fn bind(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    binding(client, app, name, "bind").await
}

/// Unbind an instance from the app.
pub async fn unbind(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    binding(client, app, name, "unbind").await
}

async fn binding(
    client: &mut Client,
    app: &str,
    name: &str,
    action: &str,
) -> Result<(), ApiError> {
    client
        .patch(
            &format!("apps/{app}/resources/{name}/binding/"),
            json!({ "bind_action": action }),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("resource {name}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_deserializes_data_map() {
        let resource: Resource = serde_json::from_str(
            r#"{"name":"db","plan":"postgres:small","data":{"DATABASE_URL":"postgres://"}}"#,
        )
        .expect("resource");
        assert!(resource.data.contains_key("DATABASE_URL"));
    }
}
