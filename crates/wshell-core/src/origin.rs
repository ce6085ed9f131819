//! The discovered API origin of the wallet daemon

use std::fmt;

use url::Url;

use crate::error::{Error, Result};

/// The base URL (scheme + host + port) at which the daemon's HTTP API is
/// reachable.
///
/// Discovered at runtime from the daemon's readiness marker line. Immutable
/// for the lifetime of a daemon instance: the supervisor sets it exactly once
/// per lifetime and clears it when the daemon terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOrigin {
    url: Url,
}

impl ApiOrigin {
    /// Build an origin from the `host:port` text trailing the readiness
    /// marker. The daemon serves plain HTTP on loopback; the scheme is fixed.
    pub fn from_host_port(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::protocol("empty host:port after readiness marker"));
        }

        let url = Url::parse(&format!("http://{}", trimmed))?;
        Self::validate(url)
    }

    /// Parse a full origin URL (used for the fixed dev-server address).
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())?;
        Self::validate(url)
    }

    fn validate(url: Url) -> Result<Self> {
        if url.host_str().is_none() {
            return Err(Error::protocol(format!("origin has no host: {}", url)));
        }
        if url.port_or_known_default().is_none() {
            return Err(Error::protocol(format!("origin has no port: {}", url)));
        }
        // An origin is a base URL only; marker text with a path is malformed.
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(Error::protocol(format!("origin is not a base URL: {}", url)));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host_str(&self) -> &str {
        self.url.host_str().expect("validated at construction")
    }

    pub fn port(&self) -> u16 {
        self.url
            .port_or_known_default()
            .expect("validated at construction")
    }

    /// Resolve an API path against this origin.
    pub fn api_endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.url.join(path)?)
    }

    /// Whether `candidate` points inside this origin. Used by the sub-view
    /// attachment policy: anything not prefixed by the current origin is
    /// rejected.
    pub fn contains(&self, candidate: &str) -> bool {
        candidate.starts_with(self.url.as_str())
            || candidate.trim_end_matches('/') == self.url.as_str().trim_end_matches('/')
    }
}

impl fmt::Display for ApiOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare origin without the normalized trailing slash
        write!(f, "{}", self.url.as_str().trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_host_port() {
        let origin = ApiOrigin::from_host_port("127.0.0.1:43210").unwrap();
        assert_eq!(origin.to_string(), "http://127.0.0.1:43210");
        assert_eq!(origin.host_str(), "127.0.0.1");
        assert_eq!(origin.port(), 43210);
    }

    #[test]
    fn test_from_host_port_trims_whitespace() {
        let origin = ApiOrigin::from_host_port("  127.0.0.1:43210 \r\n").unwrap();
        assert_eq!(origin.to_string(), "http://127.0.0.1:43210");
    }

    #[test]
    fn test_empty_host_port_rejected() {
        assert!(ApiOrigin::from_host_port("   ").is_err());
        assert!(ApiOrigin::from_host_port("").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(ApiOrigin::from_host_port("not a host").is_err());
        assert!(ApiOrigin::from_host_port("host:port/with/path").is_err());
    }

    #[test]
    fn test_parse_dev_server() {
        let origin = ApiOrigin::parse("http://localhost:4200/").unwrap();
        assert_eq!(origin.host_str(), "localhost");
        assert_eq!(origin.port(), 4200);
        assert_eq!(origin.to_string(), "http://localhost:4200");
    }

    #[test]
    fn test_api_endpoint_join() {
        let origin = ApiOrigin::from_host_port("127.0.0.1:6420").unwrap();
        let endpoint = origin.api_endpoint("/api/v1/wallets/folderName").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "http://127.0.0.1:6420/api/v1/wallets/folderName"
        );
    }

    #[test]
    fn test_contains() {
        let origin = ApiOrigin::from_host_port("127.0.0.1:6420").unwrap();
        assert!(origin.contains("http://127.0.0.1:6420/"));
        assert!(origin.contains("http://127.0.0.1:6420"));
        assert!(origin.contains("http://127.0.0.1:6420/wallets"));
        assert!(!origin.contains("http://127.0.0.1:6421/"));
        assert!(!origin.contains("https://example.com/http://127.0.0.1:6420"));
    }
}
