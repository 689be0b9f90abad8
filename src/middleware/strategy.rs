//! Resolution strategies.
//!
//! A strategy is one mechanism for mapping a logical service name to an
//! [`Endpoint`]. The middleware holds an ordered chain of strategies and
//! tries them until one produces an endpoint. Every attempt is bounded by
//! the strategy's timeout, so a slow backend only delays its own slot in
//! the chain.
//!
//! Built-in strategies:
//!
//! - [`StaticTable`] — explicit name → endpoint overrides
//! - [`EnvAddress`] — the `<NAME>_ADDRESS` environment convention
//! - [`Sidecar`] — route every service through a local sidecar proxy
//! - [`DiscoveryFn`] — adapter for dynamic discovery backends

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::{Endpoint, Result};

/// Default upper bound for a single strategy attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable naming the sidecar port for [`Sidecar::from_env`].
pub const SIDECAR_PORT_VAR: &str = "VEGVISIR_SIDECAR_PORT";

/// One mechanism for resolving a service name to an endpoint.
///
/// `resolve` returns `Ok(None)` when the strategy has no answer for the
/// name (the chain moves on) and `Err` when the strategy itself failed;
/// both count as attempts.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Short name used in logs and resolution-error attempt lists.
    fn name(&self) -> &str;

    /// Upper bound for one resolve attempt.
    fn timeout(&self) -> Duration {
        DEFAULT_ATTEMPT_TIMEOUT
    }

    async fn resolve(&self, service: &str) -> Result<Option<Endpoint>>;
}

/// Explicit name → endpoint override table.
///
/// Conventionally the first strategy in a chain: deployments pin individual
/// services here and let later strategies cover the rest.
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    entries: HashMap<String, Endpoint>,
}

impl StaticTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override for a service.
    pub fn with(mut self, service: impl Into<String>, endpoint: Endpoint) -> Self {
        self.entries.insert(service.into(), endpoint);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResolutionStrategy for StaticTable {
    fn name(&self) -> &str {
        "static-table"
    }

    async fn resolve(&self, service: &str) -> Result<Option<Endpoint>> {
        Ok(self.entries.get(service).cloned())
    }
}

/// The `<PREFIX><NAME>_ADDRESS` environment variable convention.
///
/// The service name is uppercased with `-` and `.` mapped to `_`, so
/// `seats` is looked up under `SEATS_ADDRESS` (or `SDV_SEATS_ADDRESS` with
/// prefix `SDV_`). Values accept every form of [`Endpoint::parse`].
#[derive(Debug, Clone, Default)]
pub struct EnvAddress {
    prefix: String,
}

impl EnvAddress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a deployment-specific variable prefix, e.g. `SDV_`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, service: &str) -> String {
        let upper: String = service
            .chars()
            .map(|c| match c {
                '-' | '.' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        format!("{}{}_ADDRESS", self.prefix, upper)
    }
}

#[async_trait]
impl ResolutionStrategy for EnvAddress {
    fn name(&self) -> &str {
        "env-address"
    }

    async fn resolve(&self, service: &str) -> Result<Option<Endpoint>> {
        match std::env::var(self.var_name(service)) {
            Ok(raw) => Endpoint::parse(&raw).map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Sidecar deployment strategy.
///
/// In mesh/sidecar deployments every service is reachable through a local
/// proxy that routes by application id, so resolution reduces to
/// `127.0.0.1:<port>` plus an `app-id` metadata pair carrying the service
/// name.
#[derive(Debug, Clone)]
pub struct Sidecar {
    port: u16,
}

impl Sidecar {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Build from [`SIDECAR_PORT_VAR`] when it is set and parseable.
    pub fn from_env() -> Option<Self> {
        std::env::var(SIDECAR_PORT_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Self::new)
    }
}

#[async_trait]
impl ResolutionStrategy for Sidecar {
    fn name(&self) -> &str {
        "sidecar"
    }

    async fn resolve(&self, service: &str) -> Result<Option<Endpoint>> {
        Ok(Some(
            Endpoint::plaintext(format!("127.0.0.1:{}", self.port))
                .with_metadata("app-id", service),
        ))
    }
}

/// Adapter for dynamic discovery backends.
///
/// Wraps a caller-supplied async lookup. Real deployments put their
/// registry client behind this; tests use it to model slow or mutating
/// backends.
pub struct DiscoveryFn<F> {
    name: String,
    timeout: Duration,
    lookup: F,
}

impl<F, Fut> DiscoveryFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Endpoint>>> + Send,
{
    pub fn new(name: impl Into<String>, lookup: F) -> Self {
        Self {
            name: name.into(),
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
            lookup,
        }
    }

    /// Bound each lookup attempt; expired attempts fall through to the
    /// next strategy in the chain.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<F, Fut> ResolutionStrategy for DiscoveryFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<Endpoint>>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(&self, service: &str) -> Result<Option<Endpoint>> {
        (self.lookup)(service.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scheme;

    #[tokio::test]
    async fn static_table_hit_and_miss() {
        let table = StaticTable::new().with("seats", Endpoint::plaintext("127.0.0.1:50051"));
        let hit = table.resolve("seats").await.unwrap();
        assert_eq!(hit.unwrap().address(), "127.0.0.1:50051");
        assert!(table.resolve("horn").await.unwrap().is_none());
    }

    #[test]
    fn env_var_name_convention() {
        let env = EnvAddress::new();
        assert_eq!(env.var_name("seats"), "SEATS_ADDRESS");
        assert_eq!(env.var_name("seat-control"), "SEAT_CONTROL_ADDRESS");
        assert_eq!(env.var_name("cabin.horn"), "CABIN_HORN_ADDRESS");

        let prefixed = EnvAddress::with_prefix("SDV_");
        assert_eq!(prefixed.var_name("seats"), "SDV_SEATS_ADDRESS");
    }

    #[tokio::test]
    async fn env_address_reads_variable() {
        // SAFETY: variable name is unique to this test.
        unsafe { std::env::set_var("STRATEGY_UNIT_SVC_ADDRESS", "grpcs://10.0.0.7:443") };
        let env = EnvAddress::new();
        let ep = env.resolve("strategy-unit-svc").await.unwrap().unwrap();
        assert_eq!(ep.address(), "10.0.0.7:443");
        assert_eq!(ep.scheme(), Scheme::Tls);
    }

    #[tokio::test]
    async fn env_address_missing_variable_is_none() {
        let env = EnvAddress::new();
        assert!(env.resolve("no-such-service-xyz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sidecar_answers_every_service() {
        let sidecar = Sidecar::new(3500);
        let ep = sidecar.resolve("anything").await.unwrap().unwrap();
        assert_eq!(ep.address(), "127.0.0.1:3500");
        assert_eq!(
            ep.metadata(),
            &[("app-id".to_string(), "anything".to_string())]
        );
    }

    #[tokio::test]
    async fn discovery_fn_forwards_lookup() {
        let strategy = DiscoveryFn::new("lookup", |service: String| async move {
            if service == "seats" {
                Ok(Some(Endpoint::plaintext("10.1.2.3:50051")))
            } else {
                Ok(None)
            }
        });
        assert!(strategy.resolve("seats").await.unwrap().is_some());
        assert!(strategy.resolve("horn").await.unwrap().is_none());
    }
}
