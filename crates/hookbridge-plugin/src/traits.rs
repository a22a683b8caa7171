//! The capability contract implemented by plugin units.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hookbridge_core::AppResult;
use hookbridge_core::types::{HttpMethod, MethodSet, Payload};

use crate::loader::LoadedUnit;

/// Error raised by plugin code during handler invocation.
///
/// The execution engine classifies these into HTTP-style status codes by
/// inspecting the message text, so plugin authors should keep messages
/// descriptive ("resource not found", "permission denied", ...).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HandlerError {
    /// Human-readable error message.
    pub message: String,
}

impl HandlerError {
    /// Create a new handler error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {err}"))
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {err}"))
    }
}

/// A single inbound request as seen by a plugin handler.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The typed key/value payload.
    pub payload: Payload,
    /// The HTTP method name, normalized to uppercase.
    pub method: String,
}

impl Invocation {
    /// Create an invocation, normalizing the method to uppercase.
    pub fn new(payload: Payload, method: &str) -> Self {
        Self {
            payload,
            method: method.to_ascii_uppercase(),
        }
    }

    /// The parsed HTTP method, if it is one of the four known verbs.
    pub fn http_method(&self) -> Option<HttpMethod> {
        HttpMethod::parse(&self.method)
    }
}

/// The capability set a plugin unit implements.
///
/// `handle` is the required generic fallback. The four method-specific
/// capabilities default to `handle`; a unit that overrides one must also
/// declare it in its [`UnitDescriptor`] overrides so dispatch and
/// supported-method reporting see the override.
#[async_trait::async_trait]
pub trait Handler: Send + Sync {
    /// Generic fallback capability. Required.
    async fn handle(&self, invocation: &Invocation) -> Result<Payload, HandlerError>;

    /// GET capability. Defaults to the generic handler.
    async fn get(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        self.handle(invocation).await
    }

    /// POST capability. Defaults to the generic handler.
    async fn post(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        self.handle(invocation).await
    }

    /// PUT capability. Defaults to the generic handler.
    async fn put(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        self.handle(invocation).await
    }

    /// DELETE capability. Defaults to the generic handler.
    async fn delete(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        self.handle(invocation).await
    }
}

/// Metadata about a plugin unit, computed once per loaded unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Human-readable unit name.
    pub name: String,
    /// One-line description. Empty descriptions are replaced with a
    /// generated name-based one at the reporting edge.
    pub description: String,
    /// The method-specific capabilities this unit overrides.
    pub overrides: MethodSet,
}

impl UnitDescriptor {
    /// Create a descriptor with no overrides.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            overrides: MethodSet::EMPTY,
        }
    }

    /// Declare a method-specific capability override.
    #[must_use]
    pub fn with_override(mut self, method: HttpMethod) -> Self {
        self.overrides = self.overrides.with(method);
        self
    }

    /// The description to report, falling back to a generated one.
    pub fn description_or_default(&self) -> String {
        if self.description.trim().is_empty() {
            format!("Plugin unit: {}", self.name)
        } else {
            // First line only; descriptors may carry longer docs.
            self.description
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        }
    }
}

/// Factory producing single-use handlers for a loaded plugin unit.
///
/// A handler instance is created immediately before one invocation and
/// discarded afterwards; factories must therefore be cheap to call.
pub trait HandlerFactory: Send + Sync {
    /// The unit's metadata.
    fn descriptor(&self) -> UnitDescriptor;

    /// Create a fresh single-use handler.
    fn create(&self) -> Box<dyn Handler>;
}

/// The pluggable unit-loader seam: turns an on-disk location into an
/// executable plugin unit.
///
/// The production implementation is [`crate::loader::DynamicLoader`]; tests
/// substitute in-memory loaders.
pub trait UnitLoader: Send + Sync {
    /// Load the unit at `path`, validating the capability contract.
    fn load(&self, path: &Path) -> AppResult<Arc<LoadedUnit>>;
}
