use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::DEFAULT_CONNECT_TIMEOUT;
use crate::bindings::VcapServices;
use crate::destination::DESTINATION_API_PATH;
use crate::environment::Environment;
use crate::errors::{BindingError, Error, Result};
use crate::platform::{
    CloudFoundry, DestinationLookup, LocalStub, Platform, TokenGrant, TokenScope,
};
use crate::request::{OutboundRequest, ProxyLeg};
use crate::types::{CallOptions, CallOutcome};

/// Client configuration. Every field has a default: `Config::default()`
/// detects the environment and builds its own HTTP client.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Where the client runs. Detected from `VCAP_APPLICATION` when unset.
    pub environment: Option<Environment>,
    /// Service bindings to resolve instance names against. Read from
    /// `VCAP_SERVICES` when unset and running in cloud mode.
    pub vcap_services: Option<VcapServices>,
    /// Shared HTTP client override.
    pub http_client: Option<reqwest::Client>,
    /// Override the connect timeout (defaults to 5s).
    pub connect_timeout: Option<Duration>,
}

/// Calls on-premise backend resources through named destinations.
///
/// Cheap to clone; clones share the underlying HTTP client and platform
/// wiring.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("environment", &self.inner.environment)
            .finish_non_exhaustive()
    }
}

struct ClientInner {
    environment: Environment,
    platform: Box<dyn Platform>,
    http: reqwest::Client,
    connect_timeout: Duration,
}

impl Client {
    /// Build a client for the given configuration.
    ///
    /// In cloud mode the service bindings are resolved up front, so a
    /// missing or unparseable `VCAP_SERVICES` document fails here rather
    /// than on the first call.
    pub fn new(cfg: Config) -> Result<Self> {
        let connect_timeout = cfg.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let http = match cfg.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .map_err(|err| Error::Config(format!("failed to build http client: {err}")))?,
        };

        let environment = cfg.environment.unwrap_or_else(Environment::from_env);
        let platform: Box<dyn Platform> = match environment {
            Environment::Local => Box::new(LocalStub),
            Environment::Cloud => {
                let bindings = match cfg.vcap_services {
                    Some(bindings) => bindings,
                    None => VcapServices::from_env()?,
                };
                Box::new(CloudFoundry::new(http.clone(), bindings))
            }
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                environment,
                platform,
                http,
                connect_timeout,
            }),
        })
    }

    /// Build a client from the process environment alone: mode from
    /// `VCAP_APPLICATION`, bindings from `VCAP_SERVICES`.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::default())
    }

    /// Build a local-mode client, regardless of the process environment.
    pub fn local() -> Result<Self> {
        Self::new(Config {
            environment: Some(Environment::Local),
            ..Config::default()
        })
    }

    /// Environment the client was built for.
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    /// Call a backend resource through the named destination.
    ///
    /// Validates the options, resolves the three service bindings, mints
    /// the destination API token, fetches the destination, mints the proxy
    /// token, then sends the assembled request. The first failure wins and
    /// is returned unchanged; the diagnostic is logged at this boundary
    /// and nowhere else.
    pub async fn call(&self, options: CallOptions) -> Result<CallOutcome> {
        match self.inner.execute(&options).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    destination = %options.destination_name,
                    verb = options.http_verb.as_str(),
                    error = %err,
                    "destination call failed"
                );
                Err(err)
            }
        }
    }
}

impl ClientInner {
    async fn execute(&self, options: &CallOptions) -> Result<CallOutcome> {
        options.validate()?;

        let connectivity = self
            .platform
            .service_credentials(&options.connectivity_instance)?;
        let uaa = self.platform.service_credentials(&options.uaa_instance)?;
        let destination_service = self
            .platform
            .service_credentials(&options.destination_instance)?;

        let auth_url = uaa.url.as_deref().ok_or_else(|| {
            BindingError::new(&options.uaa_instance, "binding has no auth server url")
        })?;
        let api_root = destination_service.uri.as_deref().ok_or_else(|| {
            BindingError::new(&options.destination_instance, "binding has no service uri")
        })?;
        let api_url = format!("{}{}", api_root.trim_end_matches('/'), DESTINATION_API_PATH);

        let destination_token = self
            .platform
            .acquire_token(TokenGrant {
                scope: TokenScope::Destination,
                client_id: &destination_service.client_id,
                client_secret: &destination_service.client_secret,
                auth_url,
            })
            .await?;

        let destination = self
            .platform
            .resolve_destination(DestinationLookup {
                name: &options.destination_name,
                api_url: &api_url,
                token: &destination_token,
            })
            .await?;

        let proxy_token = self
            .platform
            .acquire_token(TokenGrant {
                scope: TokenScope::Proxy,
                client_id: &connectivity.client_id,
                client_secret: &connectivity.client_secret,
                auth_url,
            })
            .await?;

        let proxy = self
            .platform
            .proxy_target(&options.connectivity_instance, &connectivity)?
            .map(|target| ProxyLeg {
                target,
                token: proxy_token,
            });

        OutboundRequest::compose(options, &destination, proxy)
            .send(&self.http, self.connect_timeout)
            .await
    }
}
