//! The `WebhookExecutor` service implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, error, info};

use hookbridge_core::types::payload_from_wire;
use hookbridge_executor::{ExecutionEngine, PluginEntry};

use crate::proto;
use crate::proto::webhook_executor_server::WebhookExecutor;

/// Bridges wire messages to the execution engine.
///
/// The engine is shared; tonic dispatches each call onto its own task, so
/// every method takes `&self` and the engine handles concurrency.
#[derive(Debug, Clone)]
pub struct BridgeService {
    engine: Arc<ExecutionEngine>,
}

impl BridgeService {
    pub fn new(engine: Arc<ExecutionEngine>) -> Self {
        Self { engine }
    }
}

#[tonic::async_trait]
impl WebhookExecutor for BridgeService {
    async fn execute_plugin(
        &self,
        request: Request<proto::ExecutePluginRequest>,
    ) -> Result<Response<proto::ExecutePluginResponse>, Status> {
        let request = request.into_inner();
        info!(
            plugin = %request.plugin_name,
            method = %request.http_method,
            "ExecutePlugin request"
        );

        let payload = payload_from_wire(request.data);
        let result = self
            .engine
            .execute(&request.plugin_name, payload, &request.http_method)
            .await;

        debug!(
            plugin = %request.plugin_name,
            status = result.status_code,
            "ExecutePlugin complete"
        );

        Ok(Response::new(proto::ExecutePluginResponse {
            status_code: result.status_code,
            message: result.message,
            data: result.data.into_iter().collect(),
            error: result.error.unwrap_or_default(),
            execution_time: result.execution_time,
        }))
    }

    async fn list_plugins(
        &self,
        request: Request<proto::ListPluginsRequest>,
    ) -> Result<Response<proto::ListPluginsResponse>, Status> {
        let request = request.into_inner();
        let filter = (!request.filter.is_empty()).then_some(request.filter.as_str());

        let entries = self.engine.list_plugins(filter).map_err(|e| {
            error!(error = %e, "ListPlugins failed");
            Status::internal(format!("Failed to list plugins: {e}"))
        })?;

        let total_count = entries.len() as i32;
        Ok(Response::new(proto::ListPluginsResponse {
            plugins: entries.into_iter().map(plugin_info_to_proto).collect(),
            total_count,
        }))
    }

    async fn get_plugin_info(
        &self,
        request: Request<proto::GetPluginInfoRequest>,
    ) -> Result<Response<proto::GetPluginInfoResponse>, Status> {
        let request = request.into_inner();

        let entry = self.engine.plugin_info(&request.plugin_name).map_err(|e| {
            error!(error = %e, plugin = %request.plugin_name, "GetPluginInfo failed");
            Status::internal(format!("Failed to describe plugin: {e}"))
        })?;

        let found = entry.is_some();
        Ok(Response::new(proto::GetPluginInfoResponse {
            plugin: entry.map(plugin_info_to_proto),
            found,
        }))
    }

    async fn health_check(
        &self,
        request: Request<proto::HealthCheckRequest>,
    ) -> Result<Response<proto::HealthCheckResponse>, Status> {
        let service = request.into_inner().service;
        debug!(service = %service, "HealthCheck request");

        let report = self.engine.health();
        Ok(Response::new(proto::HealthCheckResponse {
            status: report.status.as_str().to_string(),
            message: report.message,
            details: report.details.into_iter().collect(),
        }))
    }
}

fn plugin_info_to_proto(entry: PluginEntry) -> proto::PluginInfo {
    proto::PluginInfo {
        name: entry.name,
        path: entry.path.display().to_string(),
        description: entry.description,
        supported_methods: entry.supported_methods,
        is_available: entry.is_available,
        last_modified: entry.last_modified,
    }
}
