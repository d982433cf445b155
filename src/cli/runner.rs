//! Probe runner: argument handling, registry probe and result output

use crate::cli::args::Args;
use crate::config::{ProbeConfig, parse_scope};
use crate::error::{RegistryError, Result};
use crate::http::ReqwestTransport;
use crate::registry::{Credential, RegistryAuthenticator, RegistryClient};
use indexmap::IndexMap;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Outcome of a probe, as printed to stdout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub server: String,
    pub authentication_required: bool,
    pub realm: Option<String>,
    pub service: Option<String>,
    pub username: Option<String>,
    pub scopes: IndexMap<String, String>,
    pub authentication_url: Option<String>,
}

impl ProbeReport {
    pub fn new(
        server: &str,
        authenticator: Option<&RegistryAuthenticator>,
        credential: Option<&Credential>,
        scopes: IndexMap<String, String>,
    ) -> Self {
        let username = credential.map(|c| c.username().to_string());
        match authenticator {
            Some(auth) => Self {
                server: server.to_string(),
                authentication_required: true,
                realm: Some(auth.realm().to_string()),
                service: Some(auth.service().to_string()),
                username,
                authentication_url: Some(auth.authentication_url(credential, &scopes).to_string()),
                scopes,
            },
            None => Self {
                server: server.to_string(),
                authentication_required: false,
                realm: None,
                service: None,
                username,
                scopes,
                authentication_url: None,
            },
        }
    }

    pub fn render_text(&self) -> String {
        if !self.authentication_required {
            return format!("{}: no authentication required", self.server);
        }

        let mut lines = vec![format!("{}: bearer token authentication", self.server)];
        if let Some(realm) = &self.realm {
            lines.push(format!("  realm:   {}", realm));
        }
        if let Some(service) = &self.service {
            lines.push(format!("  service: {}", service));
        }
        if let Some(username) = &self.username {
            lines.push(format!("  user:    {}", username));
        }
        for (repository, actions) in &self.scopes {
            lines.push(format!("  scope:   repository:{}:{}", repository, actions));
        }
        if let Some(url) = &self.authentication_url {
            lines.push(format!("  url:     {}", url));
        }
        lines.join("\n")
    }

    pub fn render(&self, format: &str) -> Result<String> {
        match format {
            "json" => Ok(serde_json::to_string_pretty(self)?),
            _ => Ok(self.render_text()),
        }
    }
}

pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Result<Self> {
        args.validate().map_err(RegistryError::Validation)?;
        Ok(Self { args })
    }

    /// Builds the probe configuration from arguments and environment
    pub fn config(&self) -> Result<ProbeConfig> {
        let server = self.args.registry.clone().ok_or_else(|| {
            RegistryError::Validation(
                "Registry not specified. Use --registry or REGISTRY_AUTH_SERVER".to_string(),
            )
        })?;

        let mut config = ProbeConfig::new(server, self.args.image.clone()).from_env();
        config.source_image_name = self.args.source_image.clone();
        config.push = self.args.push;
        if let Some(timeout) = self.args.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(user_agent) = &self.args.user_agent {
            config.user_agent = user_agent.clone();
        }
        for scope in &self.args.scopes {
            let (repository, actions) = parse_scope(scope)?;
            config.scopes.insert(repository, actions);
        }

        config.validate()?;
        Ok(config)
    }

    /// Credential for the token exchange, when both username and password were given
    pub fn credential(&self) -> Option<Credential> {
        match (&self.args.username, &self.args.password) {
            (Some(username), Some(password)) => Some(Credential::new(username, password)),
            _ => None,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.config()?;
        info!("Probing {} for its authentication method", config.server_url);

        let transport = ReqwestTransport::new(Duration::from_secs(config.timeout_secs))?;
        let client = RegistryClient::builder(transport, config.endpoint_properties())
            .with_user_agent(config.user_agent.clone())
            .build()?;

        let authenticator = client.get_registry_authenticator().await?;
        let credential = self.credential();
        let report = ProbeReport::new(
            &config.server_url,
            authenticator.as_ref(),
            credential.as_ref(),
            config.effective_scopes(),
        );

        println!("{}", report.render(&self.args.output)?);
        Ok(())
    }
}
