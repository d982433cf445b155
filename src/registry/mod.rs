//! Registry module for Docker Registry HTTP API v2 authentication
//!
//! Probes a registry for its `WWW-Authenticate` challenge, selects the Bearer challenge and builds
//! token request URLs for repository scopes. The token exchange itself is left to the caller.

pub mod authenticator;
pub mod challenge;
pub mod client;
pub mod credential;
pub mod endpoint;
pub mod retriever;

pub use authenticator::{RegistryAuthenticator, pull_scopes, push_scopes};
pub use challenge::{AuthScheme, AuthenticationChallenge, select_authenticator};
pub use client::{RegistryClient, RegistryClientBuilder};
pub use credential::Credential;
pub use endpoint::{RegistryEndpointProvider, RegistryEndpointRequestProperties};
pub use retriever::AuthenticationMethodRetriever;
