//! Vegvisir error types

use std::io;
use std::sync::Arc;

/// Vegvisir error types
///
/// The enum is `Clone` because a single in-flight resolution can be shared
/// by many concurrent callers; every waiter receives the same error value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum VegvisirError {
    /// No resolution strategy produced an endpoint for the service.
    ///
    /// Recoverable: the caller may retry later or surface the condition as
    /// service-unavailable. `attempted` lists the strategies tried, in
    /// chain order.
    #[error("no endpoint resolved for service '{service}' (strategies attempted: {list})", list = fmt_attempted(.attempted))]
    Resolution {
        service: String,
        attempted: Vec<String>,
    },

    /// Resolution was attempted after the middleware shut down.
    #[error("middleware is terminated")]
    Terminated,

    /// A channel or listener could not be built from a resolved endpoint.
    #[error("transport construction failed: {0}")]
    TransportConstruction(String),

    /// The server could not bind its listening address.
    ///
    /// Fatal for that server only; other services in the process continue.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The accept loop failed after the listener was bound.
    #[error("server error: {0}")]
    Serve(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

fn fmt_attempted(attempted: &[String]) -> String {
    if attempted.is_empty() {
        "none".to_string()
    } else {
        attempted.join(", ")
    }
}

/// Result type alias for vegvisir operations
pub type Result<T> = std::result::Result<T, VegvisirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_names_attempted_strategies() {
        let err = VegvisirError::Resolution {
            service: "seats".into(),
            attempted: vec!["static-table".into(), "env-address".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("seats"));
        assert!(msg.contains("static-table, env-address"));
    }

    #[test]
    fn resolution_error_with_empty_chain() {
        let err = VegvisirError::Resolution {
            service: "seats".into(),
            attempted: vec![],
        };
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn bind_error_is_cloneable() {
        let err = VegvisirError::Bind {
            address: "127.0.0.1:50051".into(),
            source: Arc::new(io::Error::new(io::ErrorKind::AddrInUse, "in use")),
        };
        let clone = err.clone();
        assert_eq!(err.to_string(), clone.to_string());
    }
}
