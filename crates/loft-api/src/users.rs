//! Platform user administration.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A platform user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Platform administrator flag.
    #[serde(default)]
    pub is_superuser: bool,
    /// Whether the account can log in.
    #[serde(default)]
    pub is_active: bool,
    /// Registration timestamp.
    #[serde(default)]
    pub date_joined: String,
}

/// List all users (administrators only).
pub async fn list(client: &mut Client) -> Result<Paged<User>, ApiError> {
    client.get_paged("users/").await
}

/// Re-enable a disabled account.
pub async fn enable(client: &mut Client, username: &str) -> Result<(), ApiError> {
    client
        .post(&format!("users/{username}/enable/"), json!({}))
        .await
        .map_err(|e| e.describe_not_found(format!("user {username}")))?;
    Ok(())
}

/// Disable an account, invalidating its sessions.
pub async fn disable(client: &mut Client, username: &str) -> Result<(), ApiError> {
    client
        .post(&format!("users/{username}/disable/"), json!({}))
        .await
        .map_err(|e| e.describe_not_found(format!("user {username}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_flags_default_false() {
        let user: User = serde_json::from_str(r#"{"username":"ada"}"#).expect("user");
        assert!(!user.is_superuser);
        assert!(!user.is_active);
    }
}
