//! Client-side factory.
//!
//! Provides [`ClientFactory`], which resolves a service's endpoint through
//! the middleware and wraps a lazily-connecting transport channel in the
//! tonic-generated stub for that service.

mod factory;

pub use factory::{ClientFactory, ClientHandle};
