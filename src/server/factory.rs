//! [`ServerFactory`] — endpoint resolution plus listener construction.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::body::Body;
use tonic::codegen::Service;
use tonic::codegen::http::{Request, Response};
use tonic::server::NamedService;
use tonic::transport::{Identity, Server, ServerTlsConfig};
use tracing::{info, warn};

use super::handle::{ServerHandle, ServerState};
use crate::telemetry;
use crate::{Middleware, Result, Scheme, ServiceDescriptor, VegvisirError};

/// Produces running servers bound to middleware-resolved endpoints.
pub struct ServerFactory;

impl ServerFactory {
    /// Start a server for `descriptor`, hosting `service`.
    ///
    /// `service` is a tonic-generated server wrapper around the caller's
    /// implementation, e.g. `SeatsServer::new(MySeats)` — any type the
    /// interface compiler emits plugs in, so there is one factory rather
    /// than one per service.
    ///
    /// The listener is bound eagerly: an in-use or unbindable address
    /// surfaces as [`VegvisirError::Bind`] here, fatal for this service
    /// only (no automatic port retry). On success the returned handle is
    /// already in [`ServerState::Listening`].
    pub async fn create<S>(
        descriptor: &ServiceDescriptor,
        middleware: &Middleware,
        service: S,
    ) -> Result<ServerHandle>
    where
        S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
            + NamedService
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let endpoint = middleware.resolve(descriptor.name()).await?;

        let addr: SocketAddr = endpoint.address().parse().map_err(|e| {
            VegvisirError::TransportConstruction(format!(
                "unlistenable address '{}': {e}",
                endpoint.address()
            ))
        })?;

        let listener = TcpListener::bind(addr).await.map_err(|e| VegvisirError::Bind {
            address: endpoint.address().to_string(),
            source: Arc::new(e),
        })?;
        let local_addr = listener.local_addr().map_err(|e| VegvisirError::Bind {
            address: endpoint.address().to_string(),
            source: Arc::new(e),
        })?;

        let mut builder = Server::builder();
        if endpoint.scheme() == Scheme::Tls {
            let creds = endpoint.credentials().ok_or_else(|| {
                VegvisirError::Configuration(format!(
                    "TLS endpoint for '{}' carries no credentials",
                    descriptor.name()
                ))
            })?;
            let cert = std::fs::read(&creds.cert_pem).map_err(|e| {
                VegvisirError::Configuration(format!("read {:?}: {e}", creds.cert_pem))
            })?;
            let key = std::fs::read(&creds.key_pem).map_err(|e| {
                VegvisirError::Configuration(format!("read {:?}: {e}", creds.key_pem))
            })?;
            let tls = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));
            builder = builder.tls_config(tls).map_err(|e| {
                VegvisirError::TransportConstruction(format!("TLS config: {e}"))
            })?;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let state = Arc::new(watch::channel(ServerState::Created).0);
        let error: Arc<Mutex<Option<VegvisirError>>> = Arc::new(Mutex::new(None));

        // The listener is bound; everything past this point runs the accept
        // loop, so the handle can already report Listening.
        state.send_replace(ServerState::Listening);

        let serve = builder
            .add_service(service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
            });

        let task_state = Arc::clone(&state);
        let task_error = Arc::clone(&error);
        let service_name = descriptor.full_name();
        let task = tokio::spawn(async move {
            if let Err(e) = serve.await {
                warn!(service = %service_name, error = %e, "server terminated with error");
                *task_error.lock().await = Some(VegvisirError::Serve(e.to_string()));
            }
            task_state.send_replace(ServerState::Stopped);
        });

        info!(
            service = %descriptor.full_name(),
            address = %local_addr,
            "server listening"
        );
        metrics::counter!(telemetry::SERVERS_STARTED_TOTAL).increment(1);

        Ok(ServerHandle::new(
            descriptor.clone(),
            endpoint,
            local_addr,
            state,
            shutdown_tx,
            error,
            task,
        ))
    }
}
