//! End-to-end tests: a real tonic server on a loopback socket, called
//! through the generated client.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use hookbridge_core::config::plugin::PluginConfig;
use hookbridge_core::types::Payload;
use hookbridge_core::{AppError, AppResult};
use hookbridge_executor::ExecutionEngine;
use hookbridge_plugin::loader::LoadedUnit;
use hookbridge_plugin::traits::{
    Handler, HandlerError, HandlerFactory, Invocation, UnitDescriptor, UnitLoader,
};
use hookbridge_rpc::BridgeService;
use hookbridge_rpc::proto;
use hookbridge_rpc::proto::webhook_executor_client::WebhookExecutorClient;
use hookbridge_rpc::proto::webhook_executor_server::WebhookExecutorServer;

struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, invocation: &Invocation) -> Result<Payload, HandlerError> {
        let mut result = invocation.payload.clone();
        result.insert("method".to_string(), json!(invocation.method.clone()));
        Ok(result)
    }
}

struct EchoFactory;

impl HandlerFactory for EchoFactory {
    fn descriptor(&self) -> UnitDescriptor {
        UnitDescriptor::new("echo", "Echoes the request payload")
    }

    fn create(&self) -> Box<dyn Handler> {
        Box::new(EchoHandler)
    }
}

struct EchoLoader;

impl UnitLoader for EchoLoader {
    fn load(&self, path: &Path) -> AppResult<Arc<LoadedUnit>> {
        if path.file_stem().and_then(|s| s.to_str()) == Some("echo") {
            Ok(Arc::new(LoadedUnit::from_factory(Box::new(EchoFactory))))
        } else {
            Err(AppError::load(format!(
                "Failed to load plugin '{}'",
                path.display()
            )))
        }
    }
}

async fn spawn_server() -> (SocketAddr, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let file = format!("echo.{}", std::env::consts::DLL_EXTENSION);
    std::fs::write(dir.path().join(file), b"").unwrap();

    let config = PluginConfig {
        directory: dir.path().display().to_string(),
        extra_directories: Vec::new(),
    };
    let engine = ExecutionEngine::new(config, Arc::new(EchoLoader));
    let service = BridgeService::new(Arc::new(engine));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        Server::builder()
            .add_service(WebhookExecutorServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    (addr, dir)
}

async fn connect(addr: SocketAddr) -> WebhookExecutorClient<tonic::transport::Channel> {
    WebhookExecutorClient::connect(format!("http://{addr}"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_execute_plugin_over_the_wire() {
    let (addr, _dir) = spawn_server().await;
    let mut client = connect(addr).await;

    let mut data = HashMap::new();
    data.insert("key".to_string(), "value".to_string());
    let response = client
        .execute_plugin(proto::ExecutePluginRequest {
            plugin_name: "echo".to_string(),
            http_method: "POST".to_string(),
            data,
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.message, "success");
    assert_eq!(response.data["key"], "value");
    assert_eq!(response.data["method"], "POST");
    assert!(response.error.is_empty());
}

#[tokio::test]
async fn test_unknown_plugin_is_a_404_envelope_not_a_transport_error() {
    let (addr, _dir) = spawn_server().await;
    let mut client = connect(addr).await;

    let response = client
        .execute_plugin(proto::ExecutePluginRequest {
            plugin_name: "ghost".to_string(),
            http_method: "GET".to_string(),
            data: HashMap::new(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.status_code, 404);
    assert_eq!(response.message, "Plugin not found");
    assert!(response.error.contains("echo"));
}

#[tokio::test]
async fn test_list_and_describe_agree() {
    let (addr, _dir) = spawn_server().await;
    let mut client = connect(addr).await;

    let listing = client
        .list_plugins(proto::ListPluginsRequest {
            filter: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(listing.total_count, 1);
    assert_eq!(listing.plugins[0].name, "echo");

    let info = client
        .get_plugin_info(proto::GetPluginInfoRequest {
            plugin_name: "echo".to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(info.found);
    let plugin = info.plugin.unwrap();
    assert_eq!(plugin.description, listing.plugins[0].description);
    assert_eq!(plugin.supported_methods, listing.plugins[0].supported_methods);
}

#[tokio::test]
async fn test_health_check_over_the_wire() {
    let (addr, _dir) = spawn_server().await;
    let mut client = connect(addr).await;

    let response = client
        .health_check(proto::HealthCheckRequest {
            service: "hookbridge".to_string(),
        })
        .await
        .unwrap()
        .into_inner();

    assert_eq!(response.status, "healthy");
    assert_eq!(response.details["plugin_count"], "1");
    assert_eq!(response.details["total_executions"], "0");
}
