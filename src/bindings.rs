use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{BindingError, Error, Result};

/// Environment variable holding the JSON document of bound service
/// instances on Cloud Foundry.
pub const VCAP_SERVICES_VAR: &str = "VCAP_SERVICES";

/// Credentials block of a bound service instance.
///
/// Field names follow the wire format: xsuaa bindings carry `clientid`,
/// `clientsecret`, and `url`; destination service bindings carry `uri`;
/// connectivity bindings carry the on-premise proxy coordinates. Fields a
/// given binding does not provide are left empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCredentials {
    #[serde(rename = "clientid", default)]
    pub client_id: String,
    #[serde(rename = "clientsecret", default)]
    pub client_secret: String,
    /// Authorization server base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Service API base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onpremise_proxy_host: Option<String>,
    #[serde(
        default,
        deserialize_with = "port_from_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub onpremise_proxy_port: Option<u16>,
}

impl ServiceCredentials {
    /// `http://{host}:{port}` when the binding carries on-premise proxy
    /// coordinates. The connectivity proxy speaks plain HTTP.
    pub fn proxy_url(&self) -> Option<String> {
        let host = self.onpremise_proxy_host.as_deref()?;
        let port = self.onpremise_proxy_port?;
        Some(format!("http://{host}:{port}"))
    }
}

// Connectivity bindings have been observed to serialize the proxy port as
// either a JSON number or a string.
fn port_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u16),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(port)) => Ok(Some(port)),
        Some(Raw::Text(text)) => text
            .parse::<u16>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid proxy port {text:?}"))),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BoundService {
    #[serde(default)]
    name: String,
    #[serde(default)]
    credentials: Option<ServiceCredentials>,
}

/// Parsed `VCAP_SERVICES` document: bound service instances grouped by
/// service type, addressable by instance name.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct VcapServices {
    services: HashMap<String, Vec<BoundService>>,
}

impl VcapServices {
    pub fn from_env() -> Result<Self> {
        match std::env::var(VCAP_SERVICES_VAR) {
            Ok(raw) => Self::from_json(&raw),
            Err(_) => Err(Error::Config(format!("{VCAP_SERVICES_VAR} is not set"))),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| Error::Config(format!("{VCAP_SERVICES_VAR} is not valid JSON: {err}")))
    }

    /// Credentials of the bound instance with the given name, searching
    /// every service type in the document.
    pub fn credentials(&self, instance: &str) -> Result<ServiceCredentials> {
        let found = self
            .services
            .values()
            .flatten()
            .find(|service| service.name == instance);
        match found {
            Some(service) => service
                .credentials
                .clone()
                .ok_or_else(|| BindingError::new(instance, "binding has no credentials").into()),
            None => Err(BindingError::new(instance, "not found in VCAP_SERVICES").into()),
        }
    }
}
