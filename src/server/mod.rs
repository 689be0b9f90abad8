//! Server-side factory and handles.
//!
//! [`ServerFactory`] resolves a service's endpoint through the middleware,
//! binds a listener there, and hosts a tonic service on a background task.
//! The returned [`ServerHandle`] supports blocking-wait and graceful or
//! forced shutdown; [`ServerState`] tracks the one-directional lifecycle.

mod factory;
mod handle;

pub use factory::ServerFactory;
pub use handle::{ServerHandle, ServerState};
