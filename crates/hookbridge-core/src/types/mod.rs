//! Core type definitions used across the Hookbridge workspace.

pub mod envelope;
pub mod method;
pub mod payload;

pub use envelope::ExecutionResult;
pub use method::{HttpMethod, MethodSet};
pub use payload::{Payload, payload_from_wire, payload_to_wire};
