//! Running-server handles.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use crate::{Endpoint, Result, ServiceDescriptor, VegvisirError};

/// Lifecycle state of a hosted server.
///
/// Transitions are one-directional:
/// `Created → Listening → ShuttingDown → Stopped`. `Stopped` is terminal;
/// a handle never returns to `Listening` and the listener is never rebound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Created,
    Listening,
    ShuttingDown,
    Stopped,
}

/// Handle to one running server.
///
/// The handle exclusively owns its listener task: once bound, the address
/// stays bound until [`shutdown`](ServerHandle::shutdown) or process exit.
/// Cloning shares the same underlying server (the clone is a second handle,
/// not a second server).
#[derive(Clone)]
pub struct ServerHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    descriptor: ServiceDescriptor,
    endpoint: Endpoint,
    local_addr: SocketAddr,
    state: Arc<watch::Sender<ServerState>>,
    shutdown_tx: watch::Sender<bool>,
    error: Arc<Mutex<Option<VegvisirError>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ServerHandle {
    pub(crate) fn new(
        descriptor: ServiceDescriptor,
        endpoint: Endpoint,
        local_addr: SocketAddr,
        state: Arc<watch::Sender<ServerState>>,
        shutdown_tx: watch::Sender<bool>,
        error: Arc<Mutex<Option<VegvisirError>>>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                descriptor,
                endpoint,
                local_addr,
                state,
                shutdown_tx,
                error,
                task: Mutex::new(Some(task)),
            }),
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.inner.descriptor
    }

    /// The endpoint the middleware resolved for this server.
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// The actually-bound address (useful with `:0` port requests).
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    pub fn state(&self) -> ServerState {
        *self.inner.state.borrow()
    }

    /// Suspend until the server has stopped.
    ///
    /// Returns the accept-loop error if serving failed; `Ok(())` after a
    /// clean shutdown. Safe to call from multiple tasks; returns
    /// immediately once the server is already stopped.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        // An error here means the sender is gone, which only happens when
        // the server is already torn down; fall through to the error check.
        let _ = rx.wait_for(|s| *s == ServerState::Stopped).await;

        match self.inner.error.lock().await.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Stop the server.
    ///
    /// With `graceful`, new connections are refused and in-flight calls
    /// drain before this returns. Without it, the serve task is aborted
    /// immediately; a forced shutdown also takes over a graceful one that
    /// is dragging on. Idempotent — a second call is a no-op.
    pub async fn shutdown(&self, graceful: bool) {
        if graceful {
            let mut initiated = false;
            self.inner.state.send_if_modified(|s| {
                if *s < ServerState::ShuttingDown {
                    *s = ServerState::ShuttingDown;
                    initiated = true;
                    true
                } else {
                    false
                }
            });
            if !initiated {
                return;
            }

            let _ = self.inner.shutdown_tx.send(true);
            let mut rx = self.inner.state.subscribe();
            let _ = rx.wait_for(|s| *s == ServerState::Stopped).await;
        } else {
            self.inner.state.send_if_modified(|s| {
                if *s < ServerState::ShuttingDown {
                    *s = ServerState::ShuttingDown;
                    true
                } else {
                    false
                }
            });
            if let Some(task) = self.inner.task.lock().await.take() {
                task.abort();
                let _ = task.await;
            }
            self.inner.state.send_if_modified(|s| {
                if *s != ServerState::Stopped {
                    *s = ServerState::Stopped;
                    true
                } else {
                    false
                }
            });
        }
    }
}

impl std::fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHandle")
            .field("service", &self.inner.descriptor.full_name())
            .field("local_addr", &self.inner.local_addr)
            .field("state", &self.state())
            .finish()
    }
}
