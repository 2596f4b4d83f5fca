use serde::{Deserialize, Serialize};

use crate::errors::{DestinationLookupError, Result};
use crate::platform::DestinationLookup;

/// Destination API path under the destination service base URL.
pub(crate) const DESTINATION_API_PATH: &str = "/destination-configuration/v1/destinations";

/// A destination document as returned by the destination API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    #[serde(rename = "destinationConfiguration")]
    pub destination_configuration: DestinationConfiguration,
    /// Tokens the destination service acquired on the caller's behalf when
    /// the destination is configured with its own authentication.
    #[serde(rename = "authTokens", default, skip_serializing_if = "Option::is_none")]
    pub auth_tokens: Option<Vec<AuthToken>>,
}

/// The configuration block of a destination. Only the fields this crate
/// acts on are modeled; the API sends more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfiguration {
    /// Base URL of the target system.
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ProxyType", default, skip_serializing_if = "Option::is_none")]
    pub proxy_type: Option<String>,
    #[serde(
        rename = "Authentication",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authentication: Option<String>,
}

/// A token acquired by the destination service for the target system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(rename = "type")]
    pub token_type: String,
    pub value: String,
}

impl Destination {
    /// Stand-in used in local mode: the destination name is taken verbatim
    /// as the target base URL.
    pub(crate) fn local(name: &str) -> Self {
        Self {
            destination_configuration: DestinationConfiguration {
                url: name.to_string(),
                name: None,
                proxy_type: None,
                authentication: None,
            },
            auth_tokens: None,
        }
    }

    /// `Authorization` header value from the first acquired token, when the
    /// destination carries one.
    pub fn authorization_header(&self) -> Option<String> {
        let token = self.auth_tokens.as_ref()?.first()?;
        Some(format!("{} {}", token.token_type, token.value))
    }
}

/// Fetch a destination document by name from the destination API.
pub(crate) async fn fetch_destination(
    http: &reqwest::Client,
    lookup: DestinationLookup<'_>,
) -> Result<Destination> {
    let url = format!("{}/{}", lookup.api_url, lookup.name);

    #[cfg(feature = "tracing")]
    tracing::debug!(destination = lookup.name, "resolving destination");

    let resp = http
        .get(&url)
        .bearer_auth(lookup.token.as_str())
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|err| DestinationLookupError::transport(lookup.name, err))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DestinationLookupError::status(lookup.name, status, body).into());
    }

    let raw = resp
        .text()
        .await
        .map_err(|err| DestinationLookupError::transport(lookup.name, err))?;
    serde_json::from_str(&raw)
        .map_err(|err| DestinationLookupError::decode(lookup.name, err).into())
}
