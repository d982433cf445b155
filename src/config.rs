//! Configuration for probing a registry and building token URLs

use crate::error::{RegistryError, Result};
use crate::registry::client::DEFAULT_USER_AGENT;
use crate::registry::{RegistryEndpointRequestProperties, pull_scopes, push_scopes};
use indexmap::IndexMap;
use std::env;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub server_url: String,
    pub image_name: String,
    pub source_image_name: Option<String>,
    /// Repository name to scope actions; empty means "derive from the image"
    pub scopes: IndexMap<String, String>,
    pub push: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl ProbeConfig {
    pub fn new(server_url: String, image_name: String) -> Self {
        Self {
            server_url,
            image_name,
            source_image_name: None,
            scopes: IndexMap::new(),
            push: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Applies `REGISTRY_AUTH_TIMEOUT` when set and parseable
    pub fn from_env(mut self) -> Self {
        if let Ok(timeout) = env::var("REGISTRY_AUTH_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.timeout_secs = t;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            return Err(RegistryError::Validation(
                "Registry server cannot be empty".to_string(),
            ));
        }

        if self.image_name.trim().is_empty() {
            return Err(RegistryError::Validation(
                "Image name cannot be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(RegistryError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        for (repository, actions) in &self.scopes {
            if repository.is_empty() || actions.is_empty() {
                return Err(RegistryError::Validation(format!(
                    "Invalid scope '{}={}'",
                    repository, actions
                )));
            }
        }

        Ok(())
    }

    pub fn endpoint_properties(&self) -> RegistryEndpointRequestProperties {
        let properties =
            RegistryEndpointRequestProperties::new(self.server_url.clone(), self.image_name.clone());
        match &self.source_image_name {
            Some(source) => properties.with_source_image(source.clone()),
            None => properties,
        }
    }

    /// Scopes to request: explicit ones if given, otherwise pull (or push) on the image
    pub fn effective_scopes(&self) -> IndexMap<String, String> {
        if !self.scopes.is_empty() {
            return self.scopes.clone();
        }

        let properties = self.endpoint_properties();
        if self.push {
            push_scopes(&properties)
        } else {
            pull_scopes(&properties)
        }
    }
}

/// Parses `repository=actions`, e.g. `library/ubuntu=pull,push`
pub fn parse_scope(value: &str) -> Result<(String, String)> {
    let (repository, actions) = value.split_once('=').ok_or_else(|| {
        RegistryError::Validation(format!(
            "Invalid scope '{}'. Expected: repository=actions",
            value
        ))
    })?;

    let repository = repository.trim();
    let actions = actions.trim();
    if repository.is_empty() || actions.is_empty() {
        return Err(RegistryError::Validation(format!(
            "Invalid scope '{}'. Repository and actions cannot be empty",
            value
        )));
    }

    Ok((repository.to_string(), actions.to_string()))
}
