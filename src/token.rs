use std::fmt;

use serde::Deserialize;

use crate::errors::{AuthError, Result};
use crate::platform::TokenGrant;

/// OAuth2 token endpoint path under the authorization server base URL.
pub(crate) const TOKEN_PATH: &str = "/oauth/token";

/// Short-lived OAuth2 access token. Minted fresh for every call; nothing
/// is cached or refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Header value carrying this token.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Mint an access token with the OAuth2 client-credentials grant.
pub(crate) async fn fetch_client_credentials_token(
    http: &reqwest::Client,
    grant: TokenGrant<'_>,
) -> Result<AccessToken> {
    let url = format!("{}{}", grant.auth_url.trim_end_matches('/'), TOKEN_PATH);

    #[cfg(feature = "tracing")]
    tracing::debug!(scope = grant.scope.as_str(), url = %url, "requesting access token");

    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", grant.client_id),
        ("client_secret", grant.client_secret),
    ];
    let resp = http
        .post(&url)
        .header("Accept", "application/json")
        .form(&params)
        .send()
        .await
        .map_err(AuthError::transport)?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::status(status, body).into());
    }

    let token = resp
        .json::<TokenResponse>()
        .await
        .map_err(AuthError::decode)?;
    Ok(AccessToken::new(token.access_token))
}
