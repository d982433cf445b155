//! Bearer token URL construction for a registry's token realm

use crate::error::{RegistryError, Result};
use crate::registry::credential::Credential;
use crate::registry::endpoint::RegistryEndpointRequestProperties;
use indexmap::IndexMap;
use url::Url;

/// Token realm and service announced by a registry's Bearer challenge.
///
/// Only obtainable from a parsed Bearer challenge (see
/// [`crate::registry::challenge::select_authenticator`]). Immutable, so one instance can serve any
/// number of token requests against the same registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuthenticator {
    realm: Url,
    service: String,
}

impl RegistryAuthenticator {
    pub(crate) fn new(realm: &str, service: &str) -> Result<Self> {
        let realm = Url::parse(realm).map_err(|source| RegistryError::InvalidRealm {
            realm: realm.to_string(),
            source,
        })?;

        Ok(Self {
            realm,
            service: service.to_string(),
        })
    }

    pub fn realm(&self) -> &Url {
        &self.realm
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Token request URL for the given repository scopes.
    ///
    /// Produces `<realm>?service=<service>&scope=repository:<name>:<actions>`, one `scope`
    /// parameter per entry in iteration order. Each component is percent-encoded while the `:`
    /// separators stay literal. The credential belongs to the token exchange itself and does not
    /// change the URL.
    pub fn authentication_url(
        &self,
        _credential: Option<&Credential>,
        repository_scopes: &IndexMap<String, String>,
    ) -> Url {
        let mut query = format!("service={}", urlencoding::encode(&self.service));
        for (repository, scope) in repository_scopes {
            query.push_str(&format!(
                "&scope=repository:{}:{}",
                urlencoding::encode(repository),
                urlencoding::encode(scope)
            ));
        }

        let query = match self.realm.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, query),
            _ => query,
        };

        let mut url = self.realm.clone();
        url.set_query(Some(&query));
        url
    }

    pub fn pull_url(
        &self,
        credential: Option<&Credential>,
        properties: &RegistryEndpointRequestProperties,
    ) -> Url {
        self.authentication_url(credential, &pull_scopes(properties))
    }

    pub fn push_url(
        &self,
        credential: Option<&Credential>,
        properties: &RegistryEndpointRequestProperties,
    ) -> Url {
        self.authentication_url(credential, &push_scopes(properties))
    }
}

/// `pull` on the target repository
pub fn pull_scopes(properties: &RegistryEndpointRequestProperties) -> IndexMap<String, String> {
    let mut scopes = IndexMap::new();
    scopes.insert(properties.image_name().to_string(), "pull".to_string());
    scopes
}

/// `pull,push` on the target repository, plus `pull` on the mount source if one is set
pub fn push_scopes(properties: &RegistryEndpointRequestProperties) -> IndexMap<String, String> {
    let mut scopes = IndexMap::new();
    scopes.insert(properties.image_name().to_string(), "pull,push".to_string());
    if let Some(source) = properties.source_image_name() {
        if source != properties.image_name() {
            scopes.insert(source.to_string(), "pull".to_string());
        }
    }
    scopes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> RegistryAuthenticator {
        RegistryAuthenticator::new("https://somerealm", "someservice").unwrap()
    }

    fn scopes(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_authentication_url() {
        let url = authenticator().authentication_url(None, &scopes(&[("someImageName", "someScope")]));
        assert_eq!(
            url,
            Url::parse("https://somerealm?service=someservice&scope=repository:someImageName:someScope")
                .unwrap()
        );
    }

    #[test]
    fn test_authentication_url_multiple_scopes() {
        let url = authenticator().authentication_url(
            None,
            &scopes(&[("first/image", "pull"), ("second", "pull,push")]),
        );
        assert_eq!(
            url.query(),
            Some("service=someservice&scope=repository:first%2Fimage:pull&scope=repository:second:pull%2Cpush")
        );

        let scope_values: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(
            scope_values,
            vec!["repository:first/image:pull", "repository:second:pull,push"]
        );
    }

    #[test]
    fn test_authentication_url_order_follows_map() {
        let forward = authenticator().authentication_url(None, &scopes(&[("a", "pull"), ("b", "pull")]));
        let reverse = authenticator().authentication_url(None, &scopes(&[("b", "pull"), ("a", "pull")]));
        assert_eq!(
            forward.query(),
            Some("service=someservice&scope=repository:a:pull&scope=repository:b:pull")
        );
        assert_eq!(
            reverse.query(),
            Some("service=someservice&scope=repository:b:pull&scope=repository:a:pull")
        );
    }

    #[test]
    fn test_authentication_url_deterministic() {
        let authenticator = authenticator();
        let requested = scopes(&[("someImageName", "someScope")]);
        let credential = Credential::new("user", "secret");
        assert_eq!(
            authenticator.authentication_url(None, &requested).as_str(),
            authenticator
                .authentication_url(Some(&credential), &requested)
                .as_str()
        );
        assert_eq!(authenticator, self::authenticator());
    }

    #[test]
    fn test_authentication_url_escapes_service() {
        let authenticator = RegistryAuthenticator::new("https://auth.example/token", "my registry&co").unwrap();
        let url = authenticator.authentication_url(None, &scopes(&[("app", "pull")]));
        assert_eq!(
            url.as_str(),
            "https://auth.example/token?service=my%20registry%26co&scope=repository:app:pull"
        );
    }

    #[test]
    fn test_authentication_url_keeps_realm_query() {
        let authenticator =
            RegistryAuthenticator::new("https://auth.example/token?account=ci", "registry.example").unwrap();
        let url = authenticator.authentication_url(None, &scopes(&[("app", "pull")]));
        assert_eq!(
            url.query(),
            Some("account=ci&service=registry.example&scope=repository:app:pull")
        );
    }

    #[test]
    fn test_invalid_realm() {
        let err = RegistryAuthenticator::new("somerealm", "someservice").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidRealm { .. }));
    }

    #[test]
    fn test_pull_and_push_scopes() {
        let properties = RegistryEndpointRequestProperties::new("registry.example", "team/app");
        assert_eq!(pull_scopes(&properties), scopes(&[("team/app", "pull")]));
        assert_eq!(push_scopes(&properties), scopes(&[("team/app", "pull,push")]));

        let mounting = properties.clone().with_source_image("team/base");
        assert_eq!(
            push_scopes(&mounting),
            scopes(&[("team/app", "pull,push"), ("team/base", "pull")])
        );

        let same_source = properties.with_source_image("team/app");
        assert_eq!(push_scopes(&same_source), scopes(&[("team/app", "pull,push")]));
    }

    #[test]
    fn test_push_url() {
        let properties =
            RegistryEndpointRequestProperties::new("registry.example", "app").with_source_image("base");
        let url = authenticator().push_url(None, &properties);
        assert_eq!(
            url.query(),
            Some("service=someservice&scope=repository:app:pull%2Cpush&scope=repository:base:pull")
        );

        let url = authenticator().pull_url(None, &properties);
        assert_eq!(url.query(), Some("service=someservice&scope=repository:app:pull"));
    }
}
