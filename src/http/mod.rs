//! HTTP request/response model shared by registry endpoints
//!
//! The registry layer only describes requests and interprets responses; executing them is the job
//! of an [`HttpTransport`].

pub mod transport;

pub use transport::{HttpTransport, ReqwestTransport, TransportError};

use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Method, StatusCode};
use url::Url;

/// Request body with its media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContent {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Fully described request, ready for a transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<BlobContent>,
}

/// Successful (2xx) response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

/// Non-success response returned by the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP error: registry responded with status {status}")]
pub struct ResponseError {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseError {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// All `WWW-Authenticate` values in the order the registry sent them.
    ///
    /// Returns `None` when the header is absent altogether, which is a different failure from a
    /// header whose values cannot be used.
    pub fn authenticate_as_list(&self) -> Option<Vec<String>> {
        let values: Vec<String> = self
            .headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect();

        if values.is_empty() { None } else { Some(values) }
    }
}
