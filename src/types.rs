use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::DEFAULT_CONTENT_TYPE;
use crate::errors::{Error, Result, ValidationError};

/// Verb of the backend call. `PostForm` is first-class: it decides both the
/// wire method and the body encoding, so the two can never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    #[default]
    Get,
    Head,
    Options,
    Post,
    /// POST with an urlencoded form body instead of a JSON payload.
    PostForm,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    /// Parse a verb token. Unknown tokens are rejected here, before any
    /// request is assembled.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            "POST" => Ok(HttpVerb::Post),
            "POST_FORM" => Ok(HttpVerb::PostForm),
            "PUT" => Ok(HttpVerb::Put),
            "PATCH" => Ok(HttpVerb::Patch),
            "DELETE" => Ok(HttpVerb::Delete),
            other => Err(ValidationError::new(format!("unsupported http verb {other:?}"))
                .with_field("http_verb")
                .into()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::Post => "POST",
            HttpVerb::PostForm => "POST_FORM",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
        }
    }

    /// Method sent on the wire. Form submission is a POST.
    pub(crate) fn method(&self) -> Method {
        match self {
            HttpVerb::Get => Method::GET,
            HttpVerb::Head => Method::HEAD,
            HttpVerb::Options => Method::OPTIONS,
            HttpVerb::Post | HttpVerb::PostForm => Method::POST,
            HttpVerb::Put => Method::PUT,
            HttpVerb::Patch => Method::PATCH,
            HttpVerb::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Everything a single backend call needs: the path on the target system,
/// the verb, the names of the three service instances and of the
/// destination, and the optional body and response-shaping flags.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Path (and query) appended verbatim to the destination URL.
    pub url: String,
    pub http_verb: HttpVerb,
    /// Name of the bound connectivity service instance.
    pub connectivity_instance: String,
    /// Name of the bound xsuaa service instance.
    pub uaa_instance: String,
    /// Name of the bound destination service instance.
    pub destination_instance: String,
    /// Name of the destination to resolve. In local mode this doubles as
    /// the target base URL.
    pub destination_name: String,
    /// JSON body for POST, PUT, and PATCH.
    pub payload: Option<Value>,
    /// Form fields for POST_FORM.
    pub form_data: Option<HashMap<String, String>>,
    /// Overrides the `Content-type` header (defaults to `application/json`).
    pub content_type: Option<String>,
    /// Return status and headers along with the body.
    pub full_response: bool,
    /// Treat non-2xx replies as payload, failing only on transport errors.
    pub tech_error_only: bool,
    /// Read the body as raw bytes instead of text.
    pub binary: bool,
    /// Location ID of the Cloud Connector to route through, when several
    /// are attached to the subaccount.
    pub scc_location_id: Option<String>,
}

impl CallOptions {
    pub fn new(http_verb: HttpVerb, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_verb,
            ..Self::default()
        }
    }

    /// Names of the bound connectivity, xsuaa, and destination service
    /// instances used to resolve credentials.
    pub fn with_instances(
        mut self,
        connectivity: impl Into<String>,
        uaa: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.connectivity_instance = connectivity.into();
        self.uaa_instance = uaa.into();
        self.destination_instance = destination.into();
        self
    }

    pub fn with_destination(mut self, name: impl Into<String>) -> Self {
        self.destination_name = name.into();
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_form_data(mut self, form_data: HashMap<String, String>) -> Self {
        self.form_data = Some(form_data);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_scc_location(mut self, location_id: impl Into<String>) -> Self {
        self.scc_location_id = Some(location_id.into());
        self
    }

    pub fn full_response(mut self) -> Self {
        self.full_response = true;
        self
    }

    pub fn tech_error_only(mut self) -> Self {
        self.tech_error_only = true;
        self
    }

    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }

    pub(crate) fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Coherence checks that must pass before any collaborator is invoked.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ValidationError::new("must not be empty")
                .with_field("url")
                .into());
        }
        if self.form_data.is_some() && self.http_verb != HttpVerb::PostForm {
            return Err(ValidationError::new("requires the POST_FORM verb")
                .with_field("form_data")
                .into());
        }
        if self.http_verb == HttpVerb::PostForm && self.form_data.is_none() {
            return Err(ValidationError::new("is required for POST_FORM")
                .with_field("form_data")
                .into());
        }
        if self.payload.is_some() && self.form_data.is_some() {
            return Err(ValidationError::new("is mutually exclusive with form_data")
                .with_field("payload")
                .into());
        }
        Ok(())
    }
}

/// Response body, decoded as text unless the call asked for raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    Binary(Bytes),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ResponseBody::Text(text) => text.as_bytes(),
            ResponseBody::Binary(bytes) => bytes,
        }
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(self.as_bytes()).map_err(Error::from)
    }
}

/// Body plus transport metadata, returned when `full_response` is set.
#[derive(Debug, Clone)]
pub struct FullResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

/// What a call produced: just the body, or the full response when asked.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    Body(ResponseBody),
    Full(FullResponse),
}

impl CallOutcome {
    pub fn body(&self) -> &ResponseBody {
        match self {
            CallOutcome::Body(body) => body,
            CallOutcome::Full(full) => &full.body,
        }
    }

    pub fn into_body(self) -> ResponseBody {
        match self {
            CallOutcome::Body(body) => body,
            CallOutcome::Full(full) => full.body,
        }
    }

    pub fn full(&self) -> Option<&FullResponse> {
        match self {
            CallOutcome::Body(_) => None,
            CallOutcome::Full(full) => Some(full),
        }
    }

    /// Status of the reply, observable only with `full_response`.
    pub fn status(&self) -> Option<StatusCode> {
        self.full().map(|full| full.status)
    }

    /// Deserialize the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        self.body().json()
    }
}
