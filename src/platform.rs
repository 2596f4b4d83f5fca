use std::future::Future;
use std::pin::Pin;

use crate::bindings::{ServiceCredentials, VcapServices};
use crate::destination::{Destination, fetch_destination};
use crate::errors::{BindingError, Result};
use crate::token::{AccessToken, fetch_client_credentials_token};

/// Boxed future used by [`Platform`] so the trait stays object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fixed token handed out for the destination API scope in local mode.
pub const MOCK_LOCAL_ACCESS_TOKEN: &str = "mockLocalAccessToken";
/// Fixed token handed out for the connectivity proxy scope in local mode.
pub const MOCK_LOCAL_PROXY_TOKEN: &str = "mockLocalProxyToken";

/// Which collaborator a token is minted for. The two grants run against
/// different service credentials and stay distinguishable in local mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    /// Read access to the destination API.
    Destination,
    /// Passage through the connectivity proxy.
    Proxy,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Destination => "destination",
            TokenScope::Proxy => "proxy",
        }
    }
}

/// Parameters of one client-credentials grant.
#[derive(Debug, Clone, Copy)]
pub struct TokenGrant<'a> {
    pub scope: TokenScope,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    /// Authorization server base URL; the token endpoint path is appended.
    pub auth_url: &'a str,
}

/// Parameters of one destination lookup.
#[derive(Debug, Clone, Copy)]
pub struct DestinationLookup<'a> {
    pub name: &'a str,
    /// Destination API root, up to and including the destinations segment.
    pub api_url: &'a str,
    pub token: &'a AccessToken,
}

/// How the client reaches its surroundings. Picked once at construction:
/// [`CloudFoundry`] against real service bindings, [`LocalStub`] for
/// development runs where none exist.
pub trait Platform: Send + Sync {
    /// Credentials of the bound service instance with the given name.
    fn service_credentials(&self, instance: &str) -> Result<ServiceCredentials>;

    /// Mint a short-lived access token for the given grant.
    fn acquire_token<'a>(&'a self, grant: TokenGrant<'a>) -> BoxFuture<'a, Result<AccessToken>>;

    /// Resolve a destination document by name.
    fn resolve_destination<'a>(
        &'a self,
        lookup: DestinationLookup<'a>,
    ) -> BoxFuture<'a, Result<Destination>>;

    /// Forward-proxy URL for the backend call, when one applies. `Ok(None)`
    /// means the call goes out directly with no proxy leg.
    fn proxy_target(
        &self,
        instance: &str,
        connectivity: &ServiceCredentials,
    ) -> Result<Option<String>>;
}

/// The real thing: bindings from `VCAP_SERVICES`, tokens from the
/// authorization server, destinations from the destination API, backend
/// calls through the on-premise connectivity proxy.
pub struct CloudFoundry {
    http: reqwest::Client,
    bindings: VcapServices,
}

impl CloudFoundry {
    pub fn new(http: reqwest::Client, bindings: VcapServices) -> Self {
        Self { http, bindings }
    }
}

impl Platform for CloudFoundry {
    fn service_credentials(&self, instance: &str) -> Result<ServiceCredentials> {
        self.bindings.credentials(instance)
    }

    fn acquire_token<'a>(&'a self, grant: TokenGrant<'a>) -> BoxFuture<'a, Result<AccessToken>> {
        Box::pin(fetch_client_credentials_token(&self.http, grant))
    }

    fn resolve_destination<'a>(
        &'a self,
        lookup: DestinationLookup<'a>,
    ) -> BoxFuture<'a, Result<Destination>> {
        Box::pin(fetch_destination(&self.http, lookup))
    }

    fn proxy_target(
        &self,
        instance: &str,
        connectivity: &ServiceCredentials,
    ) -> Result<Option<String>> {
        match connectivity.proxy_url() {
            Some(url) => Ok(Some(url)),
            None => Err(BindingError::new(
                instance,
                "binding has no on-premise proxy host and port",
            )
            .into()),
        }
    }
}

/// Stand-in used off-platform: fixed tokens, destination synthesized from
/// the name, no proxy leg. Every operation is deterministic and touches
/// no network.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStub;

impl Platform for LocalStub {
    fn service_credentials(&self, instance: &str) -> Result<ServiceCredentials> {
        Ok(ServiceCredentials {
            client_id: format!("local-{instance}"),
            client_secret: "local".into(),
            url: Some("http://localhost".into()),
            uri: Some("http://localhost".into()),
            onpremise_proxy_host: None,
            onpremise_proxy_port: None,
        })
    }

    fn acquire_token<'a>(&'a self, grant: TokenGrant<'a>) -> BoxFuture<'a, Result<AccessToken>> {
        let token = match grant.scope {
            TokenScope::Destination => MOCK_LOCAL_ACCESS_TOKEN,
            TokenScope::Proxy => MOCK_LOCAL_PROXY_TOKEN,
        };
        Box::pin(std::future::ready(Ok(AccessToken::new(token))))
    }

    fn resolve_destination<'a>(
        &'a self,
        lookup: DestinationLookup<'a>,
    ) -> BoxFuture<'a, Result<Destination>> {
        Box::pin(std::future::ready(Ok(Destination::local(lookup.name))))
    }

    fn proxy_target(
        &self,
        _instance: &str,
        _connectivity: &ServiceCredentials,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}
