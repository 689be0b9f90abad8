//! [`ClientFactory`] — endpoint resolution plus channel construction.
//!
//! Call sites never see addresses or channel plumbing: they pass the
//! service descriptor, the middleware, and the generated stub's constructor,
//! and get back a typed handle bound to the resolved endpoint.

use tonic::transport::{Channel, ClientTlsConfig};

use crate::{Endpoint, Middleware, Result, Scheme, ServiceDescriptor, VegvisirError};

/// Produces ready-to-call client handles for a service.
pub struct ClientFactory;

impl ClientFactory {
    /// Create a client handle for `descriptor`, resolving its endpoint
    /// through `middleware` and wrapping the transport channel with `bind`
    /// (typically the generated stub constructor, e.g. `SeatsClient::new`).
    ///
    /// The channel connects lazily: construction never blocks, and
    /// connection failures surface on the first call rather than here.
    /// Reconnect-on-failure is the transport layer's concern; the resolved
    /// endpoint is fixed for the life of the handle.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = ClientFactory::create(&descriptor, &middleware, SeatsClient::new).await?;
    /// ```
    pub async fn create<S>(
        descriptor: &ServiceDescriptor,
        middleware: &Middleware,
        bind: impl FnOnce(Channel) -> S,
    ) -> Result<ClientHandle<S>> {
        let endpoint = middleware.resolve(descriptor.name()).await?;
        let channel = build_channel(&endpoint)?;
        Ok(ClientHandle {
            descriptor: descriptor.clone(),
            endpoint,
            stub: bind(channel),
        })
    }
}

/// Build a lazy channel for a resolved endpoint.
fn build_channel(endpoint: &Endpoint) -> Result<Channel> {
    let uri = endpoint.uri();
    let mut transport = Channel::from_shared(uri.clone()).map_err(|e| {
        VegvisirError::TransportConstruction(format!("invalid endpoint URI '{uri}': {e}"))
    })?;

    if endpoint.scheme() == Scheme::Tls {
        let tls = ClientTlsConfig::new().with_native_roots();
        transport = transport.tls_config(tls).map_err(|e| {
            VegvisirError::TransportConstruction(format!("TLS config for '{uri}': {e}"))
        })?;
    }

    Ok(transport.connect_lazy())
}

/// A typed client bound to a resolved endpoint.
///
/// The underlying channel is reference-counted; cloning the stub (tonic
/// stubs are `Clone`) reuses the same transport, so one channel serves
/// every call site that targets the service.
pub struct ClientHandle<S> {
    descriptor: ServiceDescriptor,
    endpoint: Endpoint,
    stub: S,
}

impl<S> ClientHandle<S> {
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// The endpoint this client was bound to at construction.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn stub(&self) -> &S {
        &self.stub
    }

    /// Mutable stub access; tonic clients take `&mut self` per call.
    pub fn stub_mut(&mut self) -> &mut S {
        &mut self.stub
    }

    /// Unwrap into the bare stub, dropping the descriptor/endpoint context.
    pub fn into_stub(self) -> S {
        self.stub
    }
}
