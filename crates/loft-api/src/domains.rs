//! Domain resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A custom domain bound to an app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    /// Owning application.
    #[serde(default)]
    pub app: String,
    /// The hostname.
    #[serde(default)]
    pub domain: String,
    /// Process type the domain routes to.
    #[serde(default)]
    pub ptype: String,
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

/// List domains bound to an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<Domain>, ApiError> {
    client.get_paged(&format!("apps/{app}/domains/")).await
}

/// Bind a domain to a process type of the app.
pub async fn add(
    client: &mut Client,
    app: &str,
    domain: &str,
    ptype: &str,
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/domains/"),
            json!({ "domain": domain, "ptype": ptype }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("domain {domain}")))?;
    Ok(())
}

/// Remove a domain binding.
pub async fn remove(client: &mut Client, app: &str, domain: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/domains/{domain}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("domain {domain}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_round_trips() {
        let domain: Domain =
            serde_json::from_str(r#"{"app":"a","domain":"www.example.com","ptype":"web"}"#)
                .expect("domain");
        assert_eq!(domain.domain, "www.example.com");
        assert_eq!(domain.ptype, "web");
    }
}
