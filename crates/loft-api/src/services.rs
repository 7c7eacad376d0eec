//! Extra in-cluster service ports exposed by an app.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;

/// A service port mapping for a process type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    /// Process type the service fronts.
    #[serde(default)]
    pub ptype: String,
    /// Exposed port.
    #[serde(default)]
    pub port: u16,
    /// Protocol (TCP/UDP).
    #[serde(default)]
    pub protocol: String,
    /// Container port traffic is forwarded to.
    #[serde(default)]
    pub target_port: u16,
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    services: Vec<Service>,
}

/// List service mappings for an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Vec<Service>, ApiError> {
    let list: ServiceList = client.get_json(&format!("apps/{app}/services/")).await?;
    Ok(list.services)
}

/// Add a service mapping.
pub async fn add(
    client: &mut Client,
    app: &str,
    ptype: &str,
    port: u16,
    protocol: &str,
    target_port: u16,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/services/"),
            json!({
                "ptype": ptype,
                "port": port,
                "protocol": protocol,
                "target_port": target_port,
            }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("service {ptype}:{port}")))?;
    Ok(())
}

/// Remove the mapping for a ptype/port/protocol triple.
pub async fn remove(
    client: &mut Client,
    app: &str,
    ptype: &str,
    port: u16,
    protocol: &str,
) -> Result<(), ApiError> {
    client
        .delete(
            &format!("apps/{app}/services/"),
            Some(json!({ "ptype": ptype, "port": port, "protocol": protocol })),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("service {ptype}:{port}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_list_unwraps_envelope() {
        let list: ServiceList = serde_json::from_str(
            r#"{"services":[{"ptype":"web","port":9000,"protocol":"TCP","target_port":9000}]}"#,
        )
        .expect("services");
        assert_eq!(list.services.len(), 1);
        assert_eq!(list.services[0].port, 9000);
    }
}
