//! Multi-service runtime.
//!
//! Hosts several independently-resolved services in one process with a
//! coordinated lifecycle: start each through
//! [`ServerFactory`](crate::server::ServerFactory), register the handles
//! here, then wait or shut down as a unit. Failures stay isolated — one
//! service's error never aborts its siblings.
//!
//! The registry exists only for lifecycle coordination; it is never
//! consulted for resolution.

use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tracing::warn;

use crate::Result;
use crate::server::{ServerHandle, ServerState};

/// Default grace period for [`ServiceRuntime::shutdown_all`].
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry of running servers with coordinated startup/shutdown.
#[derive(Default)]
pub struct ServiceRuntime {
    handles: Mutex<Vec<ServerHandle>>,
}

impl ServiceRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a server handle.
    ///
    /// Registration order is preserved; `wait_all` reports the first
    /// failure in this order. Duplicate service names are tolerated but
    /// logged — descriptor identity is the interface compiler's contract,
    /// and a duplicate usually means two servers race for one address.
    pub async fn register(&self, handle: ServerHandle) {
        let mut handles = self.handles.lock().await;
        if handles
            .iter()
            .any(|h| h.descriptor().full_name() == handle.descriptor().full_name())
        {
            warn!(
                service = %handle.descriptor().full_name(),
                "duplicate service registered in runtime"
            );
        }
        handles.push(handle);
    }

    /// Number of registered handles that have not yet stopped.
    pub async fn active(&self) -> usize {
        self.handles
            .lock()
            .await
            .iter()
            .filter(|h| h.state() != ServerState::Stopped)
            .count()
    }

    /// Wait until every registered server has stopped.
    ///
    /// All handles are awaited concurrently; an individual failure does not
    /// interrupt the others. After everything has stopped, the first
    /// failure (in registration order) is returned, `Ok(())` otherwise.
    /// With no pending handles this returns immediately.
    pub async fn wait_all(&self) -> Result<()> {
        let handles = self.handles.lock().await.clone();
        let results = join_all(handles.iter().map(|h| h.wait())).await;
        for result in results {
            result?;
        }
        Ok(())
    }

    /// Shut down every registered server concurrently with the default
    /// grace period.
    pub async fn shutdown_all(&self, graceful: bool) {
        self.shutdown_all_with_timeout(graceful, DEFAULT_SHUTDOWN_TIMEOUT)
            .await
    }

    /// Shut down every registered server concurrently.
    ///
    /// Waits up to `limit` for each handle to confirm it stopped; handles
    /// still pending after the deadline are forcefully stopped and a
    /// partial-shutdown warning is logged. Never fails.
    pub async fn shutdown_all_with_timeout(&self, graceful: bool, limit: Duration) {
        let handles = self.handles.lock().await.clone();

        let stragglers: Vec<ServerHandle> = join_all(handles.iter().map(|handle| async move {
            match tokio::time::timeout(limit, handle.shutdown(graceful)).await {
                Ok(()) => None,
                Err(_) => Some(handle.clone()),
            }
        }))
        .await
        .into_iter()
        .flatten()
        .collect();

        if !stragglers.is_empty() {
            warn!(
                pending = stragglers.len(),
                "shutdown grace period elapsed; forcing remaining servers to stop"
            );
            join_all(stragglers.iter().map(|h| h.shutdown(false))).await;
        }
    }
}
