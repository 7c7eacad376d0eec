//! SSH public key resource.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// An SSH public key registered for git pushes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    /// Key identifier (usually the trailing comment of the public key).
    #[serde(default)]
    pub id: String,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// The public key material.
    #[serde(default)]
    pub public: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated: String,
}

/// List the session user's keys.
pub async fn list(client: &mut Client) -> Result<Paged<Key>, ApiError> {
    client.get_paged("keys/").await
}

/// Register a public key.
pub async fn add(client: &mut Client, id: &str, public: &str) -> Result<(), ApiError> {
    client
        .post("keys/", json!({ "id": id, "public": public }))
        .await
        .map_err(|e| e.describe_conflict(format!("key {id}")))?;
    Ok(())
}

/// Remove a key by id.
pub async fn remove(client: &mut Client, id: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("keys/{id}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("key {id}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_truncation_material_survives() {
        let key: Key =
            serde_json::from_str(r#"{"id":"ada@laptop","public":"ssh-ed25519 AAAA ada@laptop"}"#)
                .expect("key");
        assert!(key.public.starts_with("ssh-ed25519"));
    }
}
