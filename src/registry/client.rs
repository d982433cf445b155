//! Registry client executing endpoint descriptions over a transport

use crate::error::{RegistryError, Result};
use crate::http::{HttpRequest, HttpTransport, TransportError};
use crate::registry::authenticator::RegistryAuthenticator;
use crate::registry::endpoint::{RegistryEndpointProvider, RegistryEndpointRequestProperties};
use crate::registry::retriever::AuthenticationMethodRetriever;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

pub const DEFAULT_USER_AGENT: &str = concat!("registry-auth-probe/", env!("CARGO_PKG_VERSION"));

pub struct RegistryClientBuilder<T> {
    transport: T,
    properties: RegistryEndpointRequestProperties,
    user_agent: String,
}

impl<T: HttpTransport> RegistryClientBuilder<T> {
    pub fn new(transport: T, properties: RegistryEndpointRequestProperties) -> Self {
        Self {
            transport,
            properties,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<RegistryClient<T>> {
        let user_agent = HeaderValue::from_str(&self.user_agent).map_err(|e| {
            RegistryError::Validation(format!("Invalid user agent '{}': {}", self.user_agent, e))
        })?;

        Ok(RegistryClient {
            transport: self.transport,
            properties: self.properties,
            user_agent,
        })
    }
}

pub struct RegistryClient<T> {
    transport: T,
    properties: RegistryEndpointRequestProperties,
    user_agent: HeaderValue,
}

impl<T: HttpTransport> RegistryClient<T> {
    pub fn builder(
        transport: T,
        properties: RegistryEndpointRequestProperties,
    ) -> RegistryClientBuilder<T> {
        RegistryClientBuilder::new(transport, properties)
    }

    pub fn properties(&self) -> &RegistryEndpointRequestProperties {
        &self.properties
    }

    /// Base of all Registry V2 API routes, e.g. `https://registry.example/v2/`
    pub fn api_route_base(&self) -> String {
        let server = self.properties.server_url().trim_end_matches('/');
        if server.contains("://") {
            format!("{}/v2/", server)
        } else {
            format!("https://{}/v2/", server)
        }
    }

    /// Probes the registry for its authentication method.
    ///
    /// `Ok(None)` means the registry served the API root without credentials.
    pub async fn get_registry_authenticator(&self) -> Result<Option<RegistryAuthenticator>> {
        let retriever = AuthenticationMethodRetriever::new(self.properties.clone());
        let authenticator = self.call(&retriever).await?;

        match &authenticator {
            Some(auth) => info!(
                "Registry {} uses bearer tokens from {} (service {})",
                self.properties.server_url(),
                auth.realm(),
                auth.service()
            ),
            None => info!(
                "Registry {} requires no authentication",
                self.properties.server_url()
            ),
        }

        Ok(authenticator)
    }

    /// Sends the request described by `provider` and lets it interpret the outcome
    pub async fn call<P>(&self, provider: &P) -> Result<P::Output>
    where
        P: RegistryEndpointProvider,
    {
        let url = provider.api_route(&self.api_route_base())?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        let accept = provider.accept();
        if !accept.is_empty() {
            let value = HeaderValue::from_str(&accept.join(","))
                .map_err(|e| RegistryError::Validation(format!("Invalid Accept header: {}", e)))?;
            headers.insert(ACCEPT, value);
        }

        let request = HttpRequest {
            method: provider.http_method(),
            url,
            headers,
            body: provider.content(),
        };

        debug!("Attempting to {}", provider.action_description());

        match self.transport.execute(request).await {
            Ok(response) => provider.handle_response(response),
            Err(TransportError::Status(error)) => {
                debug!(
                    "{} answered with status {}",
                    self.properties.server_url(),
                    error.status()
                );
                provider.handle_http_error(error)
            }
            Err(TransportError::Network(message)) => Err(RegistryError::Network(format!(
                "Failed to {}: {}",
                provider.action_description(),
                message
            ))),
        }
    }
}
