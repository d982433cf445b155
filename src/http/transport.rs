//! Transport seam between registry endpoints and the network

use super::{HttpRequest, Response, ResponseError};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Failure reported by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The registry answered, but not with a 2xx status
    Status(ResponseError),
    /// No response was received at all
    Network(String),
}

/// Executes described requests against a registry
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<Response, TransportError> {
        (**self).execute(request).await
    }
}

/// [`HttpTransport`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> crate::error::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<Response, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(content) = request.body {
            builder = builder
                .header(CONTENT_TYPE, content.media_type)
                .body(content.data);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?
            .to_vec();

        debug!("Response status: {}", status);

        if status.is_success() {
            Ok(Response::new(status, headers, body))
        } else {
            Err(TransportError::Status(ResponseError::new(status, headers, body)))
        }
    }
}
