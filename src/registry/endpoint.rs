//! Endpoint description shared by every registry operation

use crate::error::Result;
use crate::http::{BlobContent, Response, ResponseError};
use reqwest::Method;
use url::Url;

/// Which registry and repository a request concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEndpointRequestProperties {
    server_url: String,
    image_name: String,
    source_image_name: Option<String>,
}

impl RegistryEndpointRequestProperties {
    pub fn new(server_url: impl Into<String>, image_name: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            image_name: image_name.into(),
            source_image_name: None,
        }
    }

    /// Repository blobs may be mounted from when pushing
    pub fn with_source_image(mut self, source_image_name: impl Into<String>) -> Self {
        self.source_image_name = Some(source_image_name.into());
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn source_image_name(&self) -> Option<&str> {
        self.source_image_name.as_deref()
    }
}

/// Describes one registry API call and how to interpret its outcome.
///
/// The executor ([`crate::registry::RegistryClient::call`]) owns sending; implementations only
/// provide the pieces that differ per operation.
pub trait RegistryEndpointProvider {
    type Output;

    /// Request body, `None` for bodiless requests
    fn content(&self) -> Option<BlobContent>;

    /// Media types sent in `Accept`; empty means no `Accept` header
    fn accept(&self) -> Vec<String>;

    fn http_method(&self) -> Method;

    /// Full URL of the call given the registry API base (e.g. `https://registry/v2/`)
    fn api_route(&self, api_route_base: &str) -> Result<Url>;

    /// Human readable description used in error messages
    fn action_description(&self) -> String;

    fn handle_response(&self, response: Response) -> Result<Self::Output>;

    /// Interprets a non-success response. Errors the endpoint does not understand must be
    /// returned unchanged as [`crate::error::RegistryError::Response`].
    fn handle_http_error(&self, error: ResponseError) -> Result<Self::Output>;
}
