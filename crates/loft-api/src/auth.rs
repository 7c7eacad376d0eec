//! Authentication: password login, browser token grant, whoami.

use serde::Deserialize;
use serde_json::json;

use crate::client::Client;
use crate::error::ApiError;

/// A freshly issued session token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    /// The bearer token.
    pub token: String,
    /// The user the token belongs to.
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
struct LoginUrl {
    login: String,
}

/// Current user as reported by the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Whether the user is a platform administrator.
    #[serde(default)]
    pub is_superuser: bool,
    /// First registration timestamp.
    #[serde(default)]
    pub date_joined: String,
}

/// Obtain a token synchronously from username and password.
pub async fn login(
    client: &mut Client,
    username: &str,
    password: &str,
) -> Result<TokenGrant, ApiError> {
    let grant: TokenGrant = client
        .post("auth/login/", json!({ "username": username, "password": password }))
        .await?
        .json()?;
    Ok(TokenGrant {
        username: if grant.username.is_empty() {
            username.to_string()
        } else {
            grant.username
        },
        ..grant
    })
}

/// Start a browser-mediated grant: the returned URL carries a `key` query
/// parameter the CLI polls with until the user approves.
pub async fn login_url(client: &mut Client) -> Result<String, ApiError> {
    let url: LoginUrl = client.get_json("auth/login/").await?;
    Ok(url.login)
}

/// Poll for a token issued against `key`. `Ok(None)` means not granted yet.
pub async fn token_status(
    client: &mut Client,
    key: &str,
    alias: &str,
) -> Result<Option<TokenGrant>, ApiError> {
    let path = format!("auth/token/?key={key}&alias={alias}");
    match client.post(&path, json!({})).await {
        Ok(response) => Ok(Some(response.json()?)),
        Err(ApiError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Fetch the server-side view of the current user.
pub async fn whoami(client: &mut Client) -> Result<UserInfo, ApiError> {
    client.get_json("auth/whoami/").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_grant_fills_username_default() {
        let grant: TokenGrant = serde_json::from_str(r#"{"token":"abc"}"#).expect("grant");
        assert_eq!(grant.token, "abc");
        assert!(grant.username.is_empty());
    }

    #[test]
    fn user_info_defaults() {
        let user: UserInfo = serde_json::from_str(r#"{"username":"ada"}"#).expect("user");
        assert_eq!(user.username, "ada");
        assert!(!user.is_superuser);
    }
}
