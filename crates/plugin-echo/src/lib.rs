//! Example RESTful webhook plugin.
//!
//! Demonstrates the full capability surface: a generic fallback handler
//! plus method-specific overrides for GET, POST, PUT, and DELETE. Build as
//! a `cdylib` and drop the library into a plugin directory.

use serde_json::json;

use hookbridge_plugin_sdk::export_plugin;
use hookbridge_plugin_sdk::prelude::*;

/// Echoes the request payload back with REST-flavored messages.
#[derive(Debug, Default)]
pub struct EchoPlugin;

impl EchoPlugin {
    fn respond(&self, invocation: &Invocation, message: &str) -> Payload {
        let mut result = invocation.payload.clone();
        result.insert("status".to_string(), json!("success"));
        result.insert("message".to_string(), json!(message));
        result
    }

    fn resource_id(invocation: &Invocation, fallback: &str) -> String {
        invocation
            .payload
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[async_trait]
impl Handler for EchoPlugin {
    async fn handle(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let message = format!("Generic handler called with method {}", invocation.method);
        Ok(self.respond(invocation, &message))
    }

    async fn get(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let mut result = self.respond(invocation, "GET request processed");
        result.insert(
            "resource_id".to_string(),
            json!(Self::resource_id(invocation, "all")),
        );
        Ok(result)
    }

    async fn post(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let mut result = self.respond(invocation, "Resource created");
        result.insert("resource_id".to_string(), json!("new_id_123"));
        Ok(result)
    }

    async fn put(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let mut result = self.respond(invocation, "Resource updated");
        result.insert(
            "resource_id".to_string(),
            json!(Self::resource_id(invocation, "unknown")),
        );
        Ok(result)
    }

    async fn delete(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let mut result = self.respond(invocation, "Resource deleted");
        result.insert(
            "resource_id".to_string(),
            json!(Self::resource_id(invocation, "unknown")),
        );
        Ok(result)
    }
}

/// Factory registered through the plugin entry point.
pub struct EchoFactory;

impl HandlerFactory for EchoFactory {
    fn descriptor(&self) -> UnitDescriptor {
        UnitDescriptor::new(
            "echo",
            "Example RESTful plugin demonstrating support for different HTTP methods.",
        )
        .with_override(HttpMethod::Get)
        .with_override(HttpMethod::Post)
        .with_override(HttpMethod::Put)
        .with_override(HttpMethod::Delete)
    }

    fn create(&self) -> Box<dyn Handler> {
        Box::new(EchoPlugin)
    }
}

export_plugin!(EchoFactory);
