//! Authentication method discovery
//!
//! Sends a bodiless `GET` to the registry API root. A registry that needs credentials answers
//! `401 Unauthorized` with its challenges; a registry that does not simply succeeds.

use crate::error::{RegistryError, Result};
use crate::http::{BlobContent, Response, ResponseError};
use crate::registry::authenticator::RegistryAuthenticator;
use crate::registry::challenge::select_authenticator;
use crate::registry::endpoint::{RegistryEndpointProvider, RegistryEndpointRequestProperties};
use reqwest::{Method, StatusCode};
use tracing::debug;
use url::Url;

/// Probe that turns a registry's 401 challenge into a [`RegistryAuthenticator`]
#[derive(Debug, Clone)]
pub struct AuthenticationMethodRetriever {
    properties: RegistryEndpointRequestProperties,
}

impl AuthenticationMethodRetriever {
    pub fn new(properties: RegistryEndpointRequestProperties) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &RegistryEndpointRequestProperties {
        &self.properties
    }
}

impl RegistryEndpointProvider for AuthenticationMethodRetriever {
    type Output = Option<RegistryAuthenticator>;

    fn content(&self) -> Option<BlobContent> {
        None
    }

    fn accept(&self) -> Vec<String> {
        Vec::new()
    }

    fn http_method(&self) -> Method {
        Method::GET
    }

    fn api_route(&self, api_route_base: &str) -> Result<Url> {
        Ok(Url::parse(api_route_base)?)
    }

    fn action_description(&self) -> String {
        format!(
            "retrieve authentication method for {}",
            self.properties.server_url()
        )
    }

    fn handle_response(&self, _response: Response) -> Result<Self::Output> {
        debug!(
            "{} requires no authentication",
            self.properties.server_url()
        );
        Ok(None)
    }

    fn handle_http_error(&self, error: ResponseError) -> Result<Self::Output> {
        if error.status() != StatusCode::UNAUTHORIZED {
            return Err(RegistryError::Response(error));
        }

        let Some(challenges) = error.authenticate_as_list() else {
            return Err(RegistryError::ChallengeHeaderMissing {
                action: self.action_description(),
            });
        };

        debug!(
            "{} sent {} authentication challenge(s)",
            self.properties.server_url(),
            challenges.len()
        );

        select_authenticator(&challenges, &self.action_description()).map(Some)
    }
}
