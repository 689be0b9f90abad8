//! Vegvisir - service location middleware and gRPC service factories
//!
//! For each declared RPC service, vegvisir provides a pair of factories —
//! [`ClientFactory`] producing a ready-to-use client stub and
//! [`ServerFactory`] producing a running server — bound through a single
//! [`Middleware`] that resolves logical service names to concrete
//! endpoints. Factory call sites never hard-code addresses: where a service
//! lives (static table, `<NAME>_ADDRESS` environment convention, sidecar
//! proxy, dynamic discovery) is a middleware concern, so the same binary
//! runs unchanged across deployments.
//!
//! # Example
//!
//! ```rust,no_run
//! use vegvisir::demo::{self, proto::seats_server::SeatsServer};
//! use vegvisir::middleware::strategy::StaticTable;
//! use vegvisir::{Endpoint, Middleware, ServerFactory, ServiceRuntime};
//!
//! #[tokio::main]
//! async fn main() -> vegvisir::Result<()> {
//!     let middleware = Middleware::builder()
//!         .strategy(StaticTable::new().with("seats", Endpoint::plaintext("127.0.0.1:50051")))
//!         .build();
//!
//!     let seats = demo::seats_descriptor();
//!     let server =
//!         ServerFactory::create(&seats, &middleware, SeatsServer::new(demo::UnimplementedSeats))
//!             .await?;
//!
//!     let runtime = ServiceRuntime::new();
//!     runtime.register(server).await;
//!     runtime.wait_all().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
#[cfg(feature = "demo")]
pub mod demo;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod middleware;
pub mod runtime;
pub mod server;
pub mod telemetry;

// Re-export main types at crate root
pub use client::{ClientFactory, ClientHandle};
pub use config::Config;
pub use descriptor::{MethodSignature, ServiceDescriptor};
pub use endpoint::{CredentialsRef, Endpoint, Scheme};
pub use error::{Result, VegvisirError};
pub use middleware::{Middleware, MiddlewareBuilder};
pub use runtime::ServiceRuntime;
pub use server::{ServerFactory, ServerHandle, ServerState};
