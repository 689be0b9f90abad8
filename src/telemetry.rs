//! Telemetry metric name constants.
//!
//! Centralised metric names for vegvisir operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `vegvisir_`. Counters end in `_total`.
//!
//! # Common labels
//!
//! - `status` — outcome: "ok" or "error"

/// Total resolutions performed by the middleware, cached or not.
///
/// Labels: `status` ("ok" | "error").
pub const RESOLUTIONS_TOTAL: &str = "vegvisir_resolutions_total";

/// Total resolution cache hits.
pub const CACHE_HITS_TOTAL: &str = "vegvisir_resolution_cache_hits_total";

/// Total resolution cache misses.
pub const CACHE_MISSES_TOTAL: &str = "vegvisir_resolution_cache_misses_total";

/// Total servers started through the server factory.
pub const SERVERS_STARTED_TOTAL: &str = "vegvisir_servers_started_total";
