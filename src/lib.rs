//! Registry Auth Probe Library
//!
//! Discovers how a Docker Registry V2 endpoint wants to be authenticated. An unauthenticated probe
//! provokes the registry's `401 Unauthorized`, the `WWW-Authenticate` challenges are parsed, and the
//! Bearer challenge becomes a [`RegistryAuthenticator`] that builds token request URLs for any set of
//! repository scopes.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod registry;

pub use config::ProbeConfig;
pub use error::{RegistryError, Result};
pub use registry::{
    AuthenticationMethodRetriever, RegistryAuthenticator, RegistryClient,
    RegistryEndpointRequestProperties,
};
