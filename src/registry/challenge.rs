//! `WWW-Authenticate` challenge parsing
//!
//! A registry answering 401 may offer several challenges at once (Kerberos `Negotiate` next to
//! `Bearer` is common behind corporate proxies). Only Bearer challenges can be turned into a
//! [`RegistryAuthenticator`]; every other scheme is skipped wherever it appears.

use crate::error::{RegistryError, Result};
use crate::registry::authenticator::RegistryAuthenticator;
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, warn};

/// Authentication scheme named by a challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Bearer,
    Other(String),
}

impl AuthScheme {
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("bearer") {
            AuthScheme::Bearer
        } else if token.eq_ignore_ascii_case("basic") {
            AuthScheme::Basic
        } else {
            AuthScheme::Other(token.to_string())
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::Basic => write!(f, "Basic"),
            AuthScheme::Bearer => write!(f, "Bearer"),
            AuthScheme::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One parsed `WWW-Authenticate` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationChallenge {
    scheme: AuthScheme,
    parameters: IndexMap<String, String>,
}

impl AuthenticationChallenge {
    /// Parses `<scheme> key="value",key="value"`.
    ///
    /// Returns `None` when the value has no scheme token or a parameter has an empty key. A comma
    /// inside an open quoted value belongs to that value (`scope="repository:app:pull,push"`);
    /// any other segment without `=` is ignored.
    pub fn parse(header_value: &str) -> Option<Self> {
        let header_value = header_value.trim();
        if header_value.is_empty() {
            return None;
        }

        let (scheme, params_str) = match header_value.split_once(char::is_whitespace) {
            Some((scheme, rest)) => (scheme, rest.trim()),
            None => (header_value, ""),
        };

        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | '+'))
        {
            return None;
        }

        let mut raw_parameters: Vec<(String, String)> = Vec::new();
        for segment in params_str.split(',') {
            if let Some((_, value)) = raw_parameters.last_mut() {
                if is_open_quote(value) {
                    value.push(',');
                    value.push_str(segment);
                    continue;
                }
            }

            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                debug!("Ignoring challenge parameter without value: {}", segment);
                continue;
            };

            let key = key.trim();
            if key.is_empty() {
                return None;
            }

            raw_parameters.push((key.to_ascii_lowercase(), value.trim().to_string()));
        }

        let parameters = raw_parameters
            .into_iter()
            .map(|(key, value)| {
                let value = unquote(value.trim()).to_string();
                (key, value)
            })
            .collect();

        Some(Self {
            scheme: AuthScheme::from_token(scheme),
            parameters,
        })
    }

    pub fn scheme(&self) -> &AuthScheme {
        &self.scheme
    }

    /// Parameter lookup; keys are case-insensitive
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn parameters(&self) -> &IndexMap<String, String> {
        &self.parameters
    }

    /// `realm` and `service` of a Bearer challenge, if both are present
    fn bearer_realm_and_service(&self) -> Option<(&str, &str)> {
        if self.scheme != AuthScheme::Bearer {
            return None;
        }
        Some((self.parameter("realm")?, self.parameter("service")?))
    }
}

fn is_open_quote(value: &str) -> bool {
    value.starts_with('"') && (value.len() == 1 || !value.ends_with('"'))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Picks the first usable Bearer challenge out of all `WWW-Authenticate` values.
///
/// Unparseable values and other schemes are skipped. Failing to find any Bearer challenge with
/// both `realm` and `service` is reported as
/// [`RegistryError::UnsupportedAuthenticationMethod`]; a Bearer challenge whose realm is not a
/// URL fails with [`RegistryError::InvalidRealm`].
pub fn select_authenticator(
    header_values: &[String],
    action_description: &str,
) -> Result<RegistryAuthenticator> {
    for header_value in header_values {
        let Some(challenge) = AuthenticationChallenge::parse(header_value) else {
            warn!("Ignoring malformed 'WWW-Authenticate' value: {}", header_value);
            continue;
        };

        let Some((realm, service)) = challenge.bearer_realm_and_service() else {
            debug!(
                "Skipping {} challenge without usable Bearer parameters",
                challenge.scheme()
            );
            continue;
        };

        debug!("Selected Bearer challenge: realm={}, service={}", realm, service);
        return RegistryAuthenticator::new(realm, service);
    }

    Err(RegistryError::UnsupportedAuthenticationMethod {
        action: action_description.to_string(),
        challenges: header_values.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEARER: &str =
        r#"Bearer realm="https://auth.example/token",service="registry.example",scope="repository:foo:pull""#;

    const DOCKER_HUB: &str = r#"Bearer realm="https://auth.docker.io/token",service="registry.docker.io",scope="repository:samalba/my-app:pull,push""#;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_bearer() {
        let challenge = AuthenticationChallenge::parse(BEARER).unwrap();
        assert_eq!(challenge.scheme(), &AuthScheme::Bearer);
        assert_eq!(challenge.parameter("realm"), Some("https://auth.example/token"));
        assert_eq!(challenge.parameter("service"), Some("registry.example"));
        assert_eq!(challenge.parameter("scope"), Some("repository:foo:pull"));

        let keys: Vec<&str> = challenge.parameters().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["realm", "service", "scope"]);
    }

    #[test]
    fn test_parse_case_insensitive() {
        let challenge =
            AuthenticationChallenge::parse(r#"bearer Realm="https://a/token", Service="svc""#).unwrap();
        assert_eq!(challenge.scheme(), &AuthScheme::Bearer);
        assert_eq!(challenge.parameter("REALM"), Some("https://a/token"));
        assert_eq!(challenge.parameter("service"), Some("svc"));
    }

    #[test]
    fn test_parse_basic_and_bare_schemes() {
        let basic = AuthenticationChallenge::parse(r#"Basic realm="Registry Realm""#).unwrap();
        assert_eq!(basic.scheme(), &AuthScheme::Basic);
        assert_eq!(basic.parameter("realm"), Some("Registry Realm"));

        let negotiate = AuthenticationChallenge::parse("Negotiate").unwrap();
        assert_eq!(negotiate.scheme(), &AuthScheme::Other("Negotiate".to_string()));
        assert!(negotiate.parameters().is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(AuthenticationChallenge::parse("").is_none());
        assert!(AuthenticationChallenge::parse("   ").is_none());
        assert!(AuthenticationChallenge::parse(r#"Bearer ="x""#).is_none());
        assert!(AuthenticationChallenge::parse(r#"realm="x" Bearer"#).is_none());
    }

    #[test]
    fn test_parse_ignores_segments_without_value() {
        let challenge = AuthenticationChallenge::parse("bad authentication method").unwrap();
        assert_eq!(challenge.scheme(), &AuthScheme::Other("bad".to_string()));
        assert!(challenge.parameters().is_empty());

        let challenge =
            AuthenticationChallenge::parse(r#"Bearer realm="https://a/token",error,service="svc""#)
                .unwrap();
        assert_eq!(challenge.parameter("realm"), Some("https://a/token"));
        assert_eq!(challenge.parameter("service"), Some("svc"));
    }

    #[test]
    fn test_parse_comma_inside_quoted_value() {
        let challenge = AuthenticationChallenge::parse(DOCKER_HUB).unwrap();
        assert_eq!(challenge.parameter("realm"), Some("https://auth.docker.io/token"));
        assert_eq!(challenge.parameter("service"), Some("registry.docker.io"));
        assert_eq!(
            challenge.parameter("scope"),
            Some("repository:samalba/my-app:pull,push")
        );
    }

    #[test]
    fn test_select_docker_hub_challenge_with_multi_action_scope() {
        let authenticator = select_authenticator(&values(&[DOCKER_HUB]), "probe").unwrap();
        assert_eq!(authenticator.realm().as_str(), "https://auth.docker.io/token");
        assert_eq!(authenticator.service(), "registry.docker.io");
    }

    #[test]
    fn test_select_single_bearer() {
        let authenticator = select_authenticator(&values(&[BEARER]), "probe").unwrap();
        assert_eq!(authenticator.realm().as_str(), "https://auth.example/token");
        assert_eq!(authenticator.service(), "registry.example");
    }

    #[test]
    fn test_select_bearer_regardless_of_order() {
        let first = select_authenticator(&values(&["Negotiate", BEARER]), "probe").unwrap();
        let last = select_authenticator(&values(&[BEARER, "Negotiate"]), "probe").unwrap();
        assert_eq!(first, last);
    }

    #[test]
    fn test_select_skips_basic() {
        let err = select_authenticator(&values(&[r#"Basic realm="Registry Realm""#]), "probe")
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::UnsupportedAuthenticationMethod { .. }
        ));
    }

    #[test]
    fn test_select_bearer_missing_parameters() {
        for value in [
            "Bearer",
            r#"Bearer realm="https://auth.example/token""#,
            r#"Bearer service="registry.example""#,
        ] {
            let err = select_authenticator(&values(&[value]), "probe").unwrap_err();
            match err {
                RegistryError::UnsupportedAuthenticationMethod { challenges, .. } => {
                    assert_eq!(challenges, values(&[value]));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_select_incomplete_bearer_falls_through() {
        let authenticator = select_authenticator(
            &values(&[r#"Bearer realm="https://first/token""#, BEARER]),
            "probe",
        )
        .unwrap();
        assert_eq!(authenticator.service(), "registry.example");
    }

    #[test]
    fn test_select_invalid_realm() {
        let err = select_authenticator(
            &values(&[r#"Bearer realm="not a url",service="registry.example""#]),
            "probe",
        )
        .unwrap_err();
        match err {
            RegistryError::InvalidRealm { realm, .. } => assert_eq!(realm, "not a url"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_empty_list() {
        let err = select_authenticator(&[], "retrieve authentication method for r").unwrap_err();
        assert!(err.to_string().contains(
            "Failed getting supported authentication method from 'WWW-Authenticate' header"
        ));
    }
}
