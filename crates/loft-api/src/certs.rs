//! TLS certificate resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A certificate uploaded to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cert {
    /// User-chosen certificate name.
    #[serde(default)]
    pub name: String,
    /// Certificate common name.
    #[serde(default)]
    pub common_name: String,
    /// Subject alternative names.
    #[serde(default)]
    pub san: Vec<String>,
    /// Domains the certificate is attached to.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// Not-valid-after timestamp.
    #[serde(default)]
    pub expires: String,
    /// Not-valid-before timestamp.
    #[serde(default)]
    pub starts: String,
    /// SHA256 fingerprint.
    #[serde(default)]
    pub fingerprint: String,
    /// Issuer distinguished name.
    #[serde(default)]
    pub issuer: String,
    /// Subject distinguished name.
    #[serde(default)]
    pub subject: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// List certificates for an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Cert>, ApiError> {
    client.get_paged(&format!("apps/{app}/certs/")).await
}

/// Fetch one certificate.
pub async fn get(client: &mut Client, app: &str, name: &str) -> Result<Cert, ApiError> {
    client
        .get_json(&format!("apps/{app}/certs/{name}/"))
        .await
        .map_err(|e| e.describe_not_found(format!("cert {name}")))
}

/// Upload a certificate and its private key.
pub async fn add(
    client: &mut Client,
    app: &str,
    name: &str,
    certificate: &str,
    key: &str,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/certs/"),
            json!({ "name": name, "certificate": certificate, "key": key }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("cert {name}")))?;
    Ok(())
}

/// Remove a certificate.
pub async fn remove(client: &mut Client, app: &str, name: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/certs/{name}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("cert {name}")))?;
    Ok(())
}

/// Bind a certificate to a domain.
pub async fn attach(
    client: &mut Client,
    app: &str,
    name: &str,
    domain: &str,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/certs/{name}/domain/"),
            json!({ "domain": domain }),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("cert {name} or domain {domain}")))?;
    Ok(())
}

/// Unbind a certificate from a domain.
pub async fn detach(
    client: &mut Client,
    app: &str,
    name: &str,
    domain: &str,
) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/certs/{name}/domain/{domain}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("cert {name} or domain {domain}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cert_deserializes_san_list() {
        let cert: Cert = serde_json::from_str(
            r#"{"name":"web-cert","san":["a.example.com","b.example.com"]}"#,
        )
        .expect("cert");
        assert_eq!(cert.san.len(), 2);
    }
}
