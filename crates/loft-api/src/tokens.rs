//! Session token resource.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A long-lived session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Server-assigned UUID (used for removal).
    #[serde(default)]
    pub uuid: String,
    /// Owning user.
    #[serde(default)]
    pub owner: String,
    /// User-chosen alias.
    #[serde(default)]
    pub alias: String,
    /// Redacted key preview.
    #[serde(default)]
    pub fuzzy_key: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created: String,
    /// Last use timestamp.
    #[serde(default)]
    pub updated: String,
}

/// List the session user's tokens.
pub async fn list(client: &mut Client) -> Result<Paged<Token>, ApiError> {
    client.get_paged("tokens/").await
}

/// Revoke a token by UUID.
pub async fn remove(client: &mut Client, id: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("tokens/{id}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("token {id}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_preview_is_redacted() {
        let token: Token =
            serde_json::from_str(r#"{"uuid":"u-1","alias":"laptop","fuzzy_key":"abc…xyz"}"#)
                .expect("token");
        assert_eq!(token.alias, "laptop");
    }
}
