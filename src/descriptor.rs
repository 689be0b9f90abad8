//! Service descriptors.
//!
//! A [`ServiceDescriptor`] is the static metadata an interface compiler
//! emits for one RPC service: the owning namespace, the service name, and
//! the declared method set. Factories consume descriptors read-only; the
//! middleware only ever sees the service name.

use std::collections::BTreeSet;
use std::fmt;

/// Signature of a single RPC method.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodSignature {
    name: String,
    client_streaming: bool,
    server_streaming: bool,
}

impl MethodSignature {
    /// A unary method (single request, single response).
    pub fn unary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_streaming: false,
            server_streaming: false,
        }
    }

    /// A server-streaming method.
    pub fn server_streaming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_streaming: false,
            server_streaming: true,
        }
    }

    /// A client-streaming method.
    pub fn client_streaming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_streaming: true,
            server_streaming: false,
        }
    }

    /// A bidirectionally streaming method.
    pub fn bidi_streaming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_streaming: true,
            server_streaming: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_client_streaming(&self) -> bool {
        self.client_streaming
    }

    pub fn is_server_streaming(&self) -> bool {
        self.server_streaming
    }
}

/// Static metadata describing one RPC service.
///
/// Produced once, outside this crate (by an interface compiler, or by hand
/// for tests and demos), then shared read-only by every factory targeting
/// the service. Identity is `(namespace, name)`; no two descriptors in a
/// process should share that pair — upholding the uniqueness is the
/// producer's contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    namespace: String,
    name: String,
    methods: BTreeSet<MethodSignature>,
}

impl ServiceDescriptor {
    /// Create a descriptor with an empty method set.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            methods: BTreeSet::new(),
        }
    }

    /// Add a method to the declared set.
    pub fn method(mut self, method: MethodSignature) -> Self {
        self.methods.insert(method);
        self
    }

    /// The owning namespace, e.g. `vegvisir.demo.v1`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The logical service name the middleware resolves by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared methods, in name order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.methods.iter()
    }

    /// Whether a method with the given name is declared.
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name() == name)
    }

    /// Fully-qualified `namespace.name` identity.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

impl fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_methods() {
        let desc = ServiceDescriptor::new("vegvisir.demo.v1", "seats")
            .method(MethodSignature::unary("Move"))
            .method(MethodSignature::unary("CurrentPosition"));

        assert_eq!(desc.name(), "seats");
        assert_eq!(desc.methods().count(), 2);
        assert!(desc.has_method("Move"));
        assert!(!desc.has_method("Honk"));
    }

    #[test]
    fn duplicate_methods_collapse() {
        let desc = ServiceDescriptor::new("ns", "svc")
            .method(MethodSignature::unary("Ping"))
            .method(MethodSignature::unary("Ping"));
        assert_eq!(desc.methods().count(), 1);
    }

    #[test]
    fn full_name_is_namespace_qualified() {
        let desc = ServiceDescriptor::new("vegvisir.demo.v1", "horn");
        assert_eq!(desc.full_name(), "vegvisir.demo.v1.horn");
        assert_eq!(desc.to_string(), desc.full_name());
    }

    #[test]
    fn streaming_flags() {
        let m = MethodSignature::server_streaming("Watch");
        assert!(m.is_server_streaming());
        assert!(!m.is_client_streaming());

        let b = MethodSignature::bidi_streaming("Chat");
        assert!(b.is_server_streaming() && b.is_client_streaming());
    }
}
