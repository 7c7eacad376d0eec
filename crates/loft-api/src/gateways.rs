//! Gateway resource (Gateway-API style listeners).

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A gateway owned by an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gateway {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// Gateway name.
    #[serde(default)]
    pub name: String,
    /// Listeners configured on the gateway.
    #[serde(default)]
    pub listeners: Vec<Listener>,
    /// Addresses assigned by the infrastructure.
    #[serde(default)]
    pub addresses: Vec<Address>,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
}

/// One listener on a gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listener {
    /// Listener name.
    #[serde(default)]
    pub name: String,
    /// Listening port.
    #[serde(default)]
    pub port: u16,
    /// Protocol (HTTP, HTTPS, TCP, ...).
    #[serde(default)]
    pub protocol: String,
}

/// An address assigned to a gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Address type (IPAddress, Hostname).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// The address itself.
    #[serde(default)]
    pub value: String,
}

/// List gateways for an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Gateway>, ApiError> {
    client.get_paged(&format!("apps/{app}/gateways/")).await
}

/// Create a gateway or add a listener to an existing one.
pub async fn add(
    client: &mut Client,
    app: &str,
    name: &str,
    port: u16,
    protocol: &str,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/gateways/"),
            json!({ "name": name, "port": port, "protocol": protocol }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("gateway {name}")))?;
    Ok(())
}

/// Remove a listener (and the gateway when it was the last one).
pub async fn remove(
    client: &mut Client,
    app: &str,
    name: &str,
    port: u16,
    protocol: &str,
) -> Result<(), ApiError> {
    client
        .delete(
            &format!("apps/{app}/gateways/"),
            Some(json!({ "name": name, "port": port, "protocol": protocol })),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("gateway {name}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_address_renames_type_field() {
        let gateway: Gateway = serde_json::from_str(
            r#"{"name":"g","listeners":[{"name":"g-80","port":80,"protocol":"HTTP"}],
                "addresses":[{"type":"IPAddress","value":"10.0.0.7"}]}"#,
        )
        .expect("gateway");
        assert_eq!(gateway.addresses[0].kind, "IPAddress");
        assert_eq!(gateway.listeners[0].port, 80);
    }
}
