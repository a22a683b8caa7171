//! # hookbridge-core
//!
//! Core crate for Hookbridge. Contains configuration schemas, shared domain
//! types (HTTP methods, payloads, result envelopes), and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other Hookbridge crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
