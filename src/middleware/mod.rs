//! Service-location middleware.
//!
//! The middleware is the single source of truth mapping a logical service
//! name to a connectable [`Endpoint`]. Generated client and server code
//! never hard-codes addresses; it asks the middleware, which tries its
//! configured [`ResolutionStrategy`] chain in priority order and caches the
//! winning endpoint under a bounded TTL.
//!
//! # Singleton vs. injection
//!
//! Deployments that want one shared instance use [`Middleware::global`],
//! which constructs the instance from the environment exactly once even
//! under concurrent first access. Code that prefers explicit dependency
//! injection builds an instance with [`Middleware::builder`] and passes
//! clones around; clones share the same strategies, cache, and lifecycle.
//!
//! # Concurrency
//!
//! Reads of an initialized instance are unbounded. Concurrent resolves of
//! the same uncached name share one in-flight strategy-chain invocation
//! (single-flight), so a slow discovery backend is consulted once, not once
//! per caller. Within a cache entry's TTL, resolution results are
//! monotonic: every caller sees the endpoint the winning strategy produced.

pub mod strategy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::telemetry;
use crate::{Endpoint, Result, VegvisirError};
use strategy::{EnvAddress, ResolutionStrategy, Sidecar};

/// Default time-to-live for cached resolutions.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default capacity of the resolution cache.
pub const DEFAULT_CACHE_CAPACITY: u64 = 1024;

static GLOBAL: OnceLock<Middleware> = OnceLock::new();

/// Process-wide service-location layer.
///
/// Cheap to clone; clones share strategies, cache, and lifecycle state.
#[derive(Clone)]
pub struct Middleware {
    inner: Arc<Inner>,
}

struct Inner {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
    cache: Cache<String, Endpoint>,
    attempt_timeout: Option<Duration>,
    terminated: AtomicBool,
}

impl Middleware {
    pub fn builder() -> MiddlewareBuilder {
        MiddlewareBuilder::new()
    }

    /// The process-wide singleton, constructed from the environment on
    /// first access.
    ///
    /// The instance carries the default chain: the `<NAME>_ADDRESS`
    /// environment convention, then a sidecar strategy when
    /// [`strategy::SIDECAR_PORT_VAR`] is set. Construction happens exactly
    /// once; every call returns the same instance for the process lifetime.
    pub fn global() -> &'static Middleware {
        GLOBAL.get_or_init(Middleware::from_env)
    }

    /// Build an instance from environment conventions only.
    pub fn from_env() -> Middleware {
        let mut builder = Middleware::builder().strategy(EnvAddress::new());
        if let Some(sidecar) = Sidecar::from_env() {
            builder = builder.strategy(sidecar);
        }
        builder.build()
    }

    /// Resolve a logical service name to an endpoint.
    ///
    /// Strategies are tried in chain order; the first one returning an
    /// endpoint wins and the result is cached under the configured TTL.
    /// Failures are never cached: an unresolvable name retries the full
    /// chain on every call.
    pub async fn resolve(&self, service: &str) -> Result<Endpoint> {
        if service.is_empty() {
            return Err(VegvisirError::InvalidInput(
                "service name is empty".to_string(),
            ));
        }
        if self.inner.terminated.load(Ordering::Acquire) {
            return Err(VegvisirError::Terminated);
        }

        if let Some(endpoint) = self.inner.cache.get(service).await {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
            metrics::counter!(telemetry::RESOLUTIONS_TOTAL, "status" => "ok").increment(1);
            return Ok(endpoint);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);

        let inner = Arc::clone(&self.inner);
        let name = service.to_string();
        let result = self
            .inner
            .cache
            .try_get_with(service.to_string(), async move { inner.run_chain(&name).await })
            .await
            .map_err(|e: Arc<VegvisirError>| (*e).clone());

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::RESOLUTIONS_TOTAL, "status" => status).increment(1);
        result
    }

    /// Drop any cached endpoint for the service, forcing re-resolution on
    /// the next [`resolve`](Self::resolve).
    pub async fn invalidate(&self, service: &str) {
        self.inner.cache.invalidate(service).await;
    }

    /// Terminate the middleware.
    ///
    /// Idempotent and safe from any task, including concurrently with
    /// in-flight resolves (those either complete normally or observe the
    /// terminated state). Subsequent resolves fail with
    /// [`VegvisirError::Terminated`].
    pub fn shutdown(&self) {
        if !self.inner.terminated.swap(true, Ordering::AcqRel) {
            self.inner.cache.invalidate_all();
            debug!("middleware terminated");
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.terminated.load(Ordering::Acquire)
    }

    /// Names of the configured strategies, in chain order.
    pub fn strategy_names(&self) -> Vec<String> {
        self.inner
            .strategies
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }
}

impl Inner {
    async fn run_chain(&self, service: &str) -> Result<Endpoint> {
        let mut attempted = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            attempted.push(strategy.name().to_string());
            let limit = self.attempt_timeout.unwrap_or_else(|| strategy.timeout());
            match tokio::time::timeout(limit, strategy.resolve(service)).await {
                Ok(Ok(Some(endpoint))) => {
                    debug!(
                        service,
                        strategy = strategy.name(),
                        address = endpoint.address(),
                        "resolved"
                    );
                    return Ok(endpoint);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(service, strategy = strategy.name(), error = %e, "strategy failed");
                }
                Err(_) => {
                    warn!(service, strategy = strategy.name(), "strategy timed out");
                }
            }
        }
        Err(VegvisirError::Resolution {
            service: service.to_string(),
            attempted,
        })
    }
}

/// Builder for [`Middleware`] instances.
pub struct MiddlewareBuilder {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
    cache_ttl: Duration,
    cache_capacity: u64,
    attempt_timeout: Option<Duration>,
}

impl MiddlewareBuilder {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            attempt_timeout: None,
        }
    }

    /// Append a strategy; earlier strategies have higher priority.
    pub fn strategy(mut self, strategy: impl ResolutionStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Append an already-shared strategy.
    pub fn strategy_arc(mut self, strategy: Arc<dyn ResolutionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Time-to-live for cached resolutions.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Maximum number of cached resolutions.
    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Override every strategy's per-attempt timeout.
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Middleware {
        let cache = Cache::builder()
            .max_capacity(self.cache_capacity)
            .time_to_live(self.cache_ttl)
            .build();
        Middleware {
            inner: Arc::new(Inner {
                strategies: self.strategies,
                cache,
                attempt_timeout: self.attempt_timeout,
                terminated: AtomicBool::new(false),
            }),
        }
    }
}

impl Default for MiddlewareBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::strategy::StaticTable;

    #[tokio::test]
    async fn builder_chain_order_is_preserved() {
        let mw = Middleware::builder()
            .strategy(StaticTable::new())
            .strategy(EnvAddress::new())
            .build();
        assert_eq!(mw.strategy_names(), vec!["static-table", "env-address"]);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mw = Middleware::builder()
            .strategy(StaticTable::new().with("seats", Endpoint::plaintext("127.0.0.1:50051")))
            .build();
        let clone = mw.clone();

        clone.shutdown();
        assert!(mw.is_terminated());
        assert!(matches!(
            mw.resolve("seats").await,
            Err(VegvisirError::Terminated)
        ));
    }
}
