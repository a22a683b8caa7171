//! gRPC facade for the Hookbridge execution engine.
//!
//! A separate HTTP gateway process accepts inbound webhooks and calls the
//! `WebhookExecutor` service defined here; this crate translates between
//! the wire messages and the engine's native types.

pub mod server;
pub mod service;

/// Generated protobuf types for `hookbridge.v1`.
pub mod proto {
    tonic::include_proto!("hookbridge.v1");
}

pub use server::serve;
pub use service::BridgeService;
