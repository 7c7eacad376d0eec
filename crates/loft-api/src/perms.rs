//! User permissions on apps, plus platform administrators.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;
use crate::types::Paged;

/// A user's permissions on one app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermission {
    /// The user.
    #[serde(default)]
    pub username: String,
    /// Granted permissions (`view`, `change`, `delete`).
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A platform administrator entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// The user.
    #[serde(default)]
    pub username: String,
    /// Whether the flag is active.
    #[serde(default)]
    pub is_superuser: bool,
}

/// List user permissions on an app.
pub async fn list(client: &mut Client, app: &str) -> Result<Paged<UserPermission>, ApiError> {
    client.get_paged(&format!("apps/{app}/perms/")).await
}

/// Grant permissions to a user.
pub async fn create(
    client: &mut Client,
    app: &str,
    username: &str,
    permissions: &[String],
) -> Result<(), ApiError> {
    client
        .post(
            &format!("apps/{app}/perms/"),
            json!({ "username": username, "permissions": permissions.join(",") }),
        )
        .await
        .map_err(|e| e.describe_conflict(format!("perms for {username}")))?;
    Ok(())
}

/// Replace a user's permissions.
pub async fn update(
    client: &mut Client,
    app: &str,
    username: &str,
    permissions: &[String],
) -> Result<(), ApiError> {
    client
        .request(
            reqwest::Method::PUT,
            &format!("apps/{app}/perms/{username}/"),
            Some(json!({ "permissions": permissions.join(",") })),
        )
        .await
        .map_err(|e| e.describe_not_found(format!("user {username} in app {app}")))?;
    Ok(())
}

/// Revoke all of a user's permissions on an app.
pub async fn remove(client: &mut Client, app: &str, username: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("apps/{app}/perms/{username}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("user {username} in app {app}")))?;
    Ok(())
}

/// List platform administrators.
pub async fn list_admins(client: &mut Client) -> Result<Paged<Admin>, ApiError> {
    client.get_paged("admin/perms/").await
}

/// Promote a user to administrator.
pub async fn add_admin(client: &mut Client, username: &str) -> Result<(), ApiError> {
    client
        .post("admin/perms/", json!({ "username": username }))
        .await
        .map_err(|e| e.describe_conflict(format!("admin {username}")))?;
    Ok(())
}

/// Demote an administrator.
pub async fn remove_admin(client: &mut Client, username: &str) -> Result<(), ApiError> {
    client
        .delete(&format!("admin/perms/{username}/"), None)
        .await
        .map_err(|e| e.describe_not_found(format!("admin {username}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_list_deserializes() {
        let perm: UserPermission =
            serde_json::from_str(r#"{"username":"ada","permissions":["view","change"]}"#)
                .expect("perm");
        assert_eq!(perm.permissions, vec!["view", "change"]);
    }
}
