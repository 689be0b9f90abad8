//! Resolved service endpoints.
//!
//! An [`Endpoint`] is what a resolution strategy hands back: a connectable
//! `host:port` address, the transport security mode, an optional opaque
//! credentials reference, and strategy-specific routing metadata. Endpoints
//! are consumed once per client/server construction and never mutated
//! afterwards.

use std::fmt;
use std::path::PathBuf;

use crate::{Result, VegvisirError};

/// Transport security mode of an endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    #[default]
    Plaintext,
    Tls,
}

/// Opaque reference to transport credentials: a PEM identity on disk.
///
/// The middleware never reads these files; factories pass them through to
/// the transport layer when the endpoint scheme requires them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsRef {
    pub cert_pem: PathBuf,
    pub key_pem: PathBuf,
}

/// A resolved, connectable network address plus transport security mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: String,
    scheme: Scheme,
    credentials: Option<CredentialsRef>,
    metadata: Vec<(String, String)>,
}

impl Endpoint {
    /// A plaintext endpoint at `host:port`.
    pub fn plaintext(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            scheme: Scheme::Plaintext,
            credentials: None,
            metadata: Vec::new(),
        }
    }

    /// A TLS endpoint at `host:port`.
    pub fn tls(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            scheme: Scheme::Tls,
            credentials: None,
            metadata: Vec::new(),
        }
    }

    /// Attach a credentials reference.
    pub fn with_credentials(mut self, credentials: CredentialsRef) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Append a routing metadata pair (e.g. a sidecar app id).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Parse an address as written in environment variables or config files.
    ///
    /// Accepted forms: `host:port`, `grpc://host:port`, `http://host:port`
    /// (plaintext), `grpcs://host:port`, `https://host:port` (TLS).
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(VegvisirError::InvalidInput(
                "empty endpoint address".to_string(),
            ));
        }

        let (scheme, rest) = if let Some(rest) = raw.strip_prefix("grpcs://") {
            (Scheme::Tls, rest)
        } else if let Some(rest) = raw.strip_prefix("https://") {
            (Scheme::Tls, rest)
        } else if let Some(rest) = raw.strip_prefix("grpc://") {
            (Scheme::Plaintext, rest)
        } else if let Some(rest) = raw.strip_prefix("http://") {
            (Scheme::Plaintext, rest)
        } else {
            (Scheme::Plaintext, raw)
        };

        let address = rest.trim_end_matches('/');
        if address.is_empty() {
            return Err(VegvisirError::InvalidInput(format!(
                "endpoint address '{raw}' has no host"
            )));
        }

        Ok(Self {
            address: address.to_string(),
            scheme,
            credentials: None,
            metadata: Vec::new(),
        })
    }

    /// The `host:port` transport address.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn credentials(&self) -> Option<&CredentialsRef> {
        self.credentials.as_ref()
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    /// URI form consumed by channel construction.
    pub fn uri(&self) -> String {
        match self.scheme {
            Scheme::Plaintext => format!("http://{}", self.address),
            Scheme::Tls => format!("https://{}", self.address),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_address_is_plaintext() {
        let ep = Endpoint::parse("localhost:50051").unwrap();
        assert_eq!(ep.address(), "localhost:50051");
        assert_eq!(ep.scheme(), Scheme::Plaintext);
        assert_eq!(ep.uri(), "http://localhost:50051");
    }

    #[test]
    fn grpc_prefix_is_plaintext() {
        let ep = Endpoint::parse("grpc://127.0.0.1:1234").unwrap();
        assert_eq!(ep.address(), "127.0.0.1:1234");
        assert_eq!(ep.scheme(), Scheme::Plaintext);
    }

    #[test]
    fn secure_prefixes_are_tls() {
        for raw in ["grpcs://svc.example:443", "https://svc.example:443"] {
            let ep = Endpoint::parse(raw).unwrap();
            assert_eq!(ep.scheme(), Scheme::Tls);
            assert_eq!(ep.address(), "svc.example:443");
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let ep = Endpoint::parse("http://localhost:50051/").unwrap();
        assert_eq!(ep.address(), "localhost:50051");
    }

    #[test]
    fn empty_or_hostless_is_rejected() {
        assert!(Endpoint::parse("").is_err());
        assert!(Endpoint::parse("   ").is_err());
        assert!(Endpoint::parse("grpc://").is_err());
    }

    #[test]
    fn metadata_accumulates() {
        let ep = Endpoint::plaintext("127.0.0.1:3500")
            .with_metadata("app-id", "seats")
            .with_metadata("zone", "cabin");
        assert_eq!(ep.metadata().len(), 2);
        assert_eq!(ep.metadata()[0], ("app-id".to_string(), "seats".to_string()));
    }
}
