//! Call on-premise HTTP endpoints from a Cloud Foundry app through the SAP
//! connectivity proxy, resolving per-call configuration from a named
//! destination.
#![cfg_attr(docsrs, feature(doc_cfg))]
// Allow large error types - refactoring to Box<Error> would be a breaking change
#![allow(clippy::result_large_err)]

/// Default `Content-type` sent with requests that carry one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Default connection timeout (5 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// Header naming the Cloud Connector location to route through.
pub const SCC_LOCATION_HEADER: &str = "SAP-Connectivity-SCC-Location_ID";

mod bindings;
mod client;
mod destination;
mod environment;
mod errors;
mod platform;
mod request;
mod token;
mod types;

pub use bindings::{ServiceCredentials, VCAP_SERVICES_VAR, VcapServices};
pub use client::{Client, Config};
pub use destination::{AuthToken, Destination, DestinationConfiguration};
pub use environment::{Environment, VCAP_APPLICATION_VAR};
pub use errors::{
    AuthError, BindingError, DestinationLookupError, Error, RequestError, Result, ValidationError,
};
pub use platform::{
    BoxFuture, CloudFoundry, DestinationLookup, LocalStub, MOCK_LOCAL_ACCESS_TOKEN,
    MOCK_LOCAL_PROXY_TOKEN, Platform, TokenGrant, TokenScope,
};
pub use token::AccessToken;
pub use types::{CallOptions, CallOutcome, FullResponse, HttpVerb, ResponseBody};
