use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, PROXY_AUTHORIZATION};
use serde_json::Value;

use crate::SCC_LOCATION_HEADER;
use crate::destination::Destination;
use crate::errors::{RequestError, Result};
use crate::token::AccessToken;
use crate::types::{CallOptions, CallOutcome, FullResponse, HttpVerb, ResponseBody};

/// Forward-proxy leg of a call: the proxy to route through and the token
/// authorizing passage.
#[derive(Debug, Clone)]
pub(crate) struct ProxyLeg {
    pub target: String,
    pub token: AccessToken,
}

/// Target URL: destination URL and caller path concatenated verbatim. No
/// slash joining or re-encoding; callers own the path shape.
pub(crate) fn target_url(destination_url: &str, path: &str) -> String {
    format!("{destination_url}{path}")
}

// Proxy routing is client-level in reqwest, so calls that cross the
// connectivity proxy get a client of their own.
fn build_proxied_client(target: &str, connect_timeout: Duration) -> Result<reqwest::Client> {
    let proxy = reqwest::Proxy::all(target)
        .map_err(|err| RequestError::new(format!("invalid proxy target {target:?}: {err}")))?;
    let client = reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .proxy(proxy)
        .build()
        .map_err(RequestError::transport)?;
    Ok(client)
}

/// A fully resolved backend request, ready to send.
#[derive(Debug)]
pub(crate) struct OutboundRequest {
    url: String,
    verb: HttpVerb,
    content_type: String,
    payload: Option<Value>,
    form_data: Option<HashMap<String, String>>,
    /// Precomputed `Authorization` value from the destination's auth tokens.
    destination_auth: Option<String>,
    proxy: Option<ProxyLeg>,
    scc_location_id: Option<String>,
    binary: bool,
    full_response: bool,
    tech_error_only: bool,
}

impl OutboundRequest {
    pub(crate) fn compose(
        options: &CallOptions,
        destination: &Destination,
        proxy: Option<ProxyLeg>,
    ) -> Self {
        Self {
            url: target_url(&destination.destination_configuration.url, &options.url),
            verb: options.http_verb,
            content_type: options.content_type_or_default().to_string(),
            payload: options.payload.clone(),
            form_data: options.form_data.clone(),
            destination_auth: destination.authorization_header(),
            proxy,
            scc_location_id: options.scc_location_id.clone(),
            binary: options.binary,
            full_response: options.full_response,
            tech_error_only: options.tech_error_only,
        }
    }

    /// Send the request and shape the reply per the call's flags.
    pub(crate) async fn send(
        self,
        http: &reqwest::Client,
        connect_timeout: Duration,
    ) -> Result<CallOutcome> {
        let proxied = match &self.proxy {
            Some(leg) => Some(build_proxied_client(&leg.target, connect_timeout)?),
            None => None,
        };
        let client = proxied.as_ref().unwrap_or(http);

        let mut builder = client.request(self.verb.method(), &self.url);

        if let Some(auth) = &self.destination_auth {
            builder = builder.header(AUTHORIZATION, auth.as_str());
        }
        if let Some(leg) = &self.proxy {
            builder = builder.header(PROXY_AUTHORIZATION, leg.token.bearer());
        }
        if let Some(location) = &self.scc_location_id {
            builder = builder.header(SCC_LOCATION_HEADER, location.as_str());
        }

        builder = match self.verb {
            HttpVerb::Get | HttpVerb::Head => {
                builder.header(CONTENT_TYPE, self.content_type.as_str())
            }
            HttpVerb::Options | HttpVerb::Delete => builder,
            HttpVerb::PostForm => match &self.form_data {
                Some(form) => builder.form(form),
                None => builder,
            },
            HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch => {
                builder = builder.header(CONTENT_TYPE, self.content_type.as_str());
                match &self.payload {
                    Some(payload) => builder.body(serde_json::to_vec(payload)?),
                    None => builder,
                }
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            verb = self.verb.as_str(),
            url = %self.url,
            proxied = self.proxy.is_some(),
            "sending backend request"
        );

        let resp = builder.send().await.map_err(RequestError::transport)?;

        let status = resp.status();
        if !status.is_success() && !self.tech_error_only {
            let body = resp.text().await.unwrap_or_default();
            return Err(RequestError::status(status, body).into());
        }

        let headers = self.full_response.then(|| resp.headers().clone());

        let body = if self.binary {
            ResponseBody::Binary(resp.bytes().await.map_err(RequestError::transport)?)
        } else {
            ResponseBody::Text(resp.text().await.map_err(RequestError::transport)?)
        };

        Ok(match headers {
            Some(headers) => CallOutcome::Full(FullResponse {
                status,
                headers,
                body,
            }),
            None => CallOutcome::Body(body),
        })
    }
}
