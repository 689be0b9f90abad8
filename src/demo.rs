//! Demo services.
//!
//! Generated bindings for the `vegvisir.demo.v1` Seats and Horn services,
//! plus stub implementations answering every method with `UNIMPLEMENTED`.
//! The end-to-end tests and the `vegd`/`vegq` binaries host and probe these
//! stubs; real deployments supply their own implementations of the
//! generated service traits.

/// Generated proto types for the demo services.
pub mod proto {
    tonic::include_proto!("vegvisir.demo.v1");
}

use tonic::{Request, Response, Status};

use crate::{MethodSignature, ServiceDescriptor};
use proto::horn_server::Horn;
use proto::seats_server::Seats;

/// Descriptor for the demo Seats service.
pub fn seats_descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new("vegvisir.demo.v1", "seats")
        .method(MethodSignature::unary("Move"))
        .method(MethodSignature::unary("CurrentPosition"))
}

/// Descriptor for the demo Horn service.
pub fn horn_descriptor() -> ServiceDescriptor {
    ServiceDescriptor::new("vegvisir.demo.v1", "horn").method(MethodSignature::unary("Honk"))
}

/// Seats stub: every method reports `UNIMPLEMENTED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedSeats;

#[tonic::async_trait]
impl Seats for UnimplementedSeats {
    async fn r#move(
        &self,
        _request: Request<proto::MoveRequest>,
    ) -> std::result::Result<Response<proto::MoveReply>, Status> {
        Err(Status::unimplemented("Move"))
    }

    async fn current_position(
        &self,
        _request: Request<proto::CurrentPositionRequest>,
    ) -> std::result::Result<Response<proto::CurrentPositionReply>, Status> {
        Err(Status::unimplemented("CurrentPosition"))
    }
}

/// Horn stub: every method reports `UNIMPLEMENTED`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnimplementedHorn;

#[tonic::async_trait]
impl Horn for UnimplementedHorn {
    async fn honk(
        &self,
        _request: Request<proto::HonkRequest>,
    ) -> std::result::Result<Response<proto::HonkReply>, Status> {
        Err(Status::unimplemented("Honk"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_declare_their_methods() {
        let seats = seats_descriptor();
        assert_eq!(seats.name(), "seats");
        assert!(seats.has_method("Move"));
        assert!(seats.has_method("CurrentPosition"));

        let horn = horn_descriptor();
        assert!(horn.has_method("Honk"));
        assert!(!horn.has_method("Move"));
    }
}
