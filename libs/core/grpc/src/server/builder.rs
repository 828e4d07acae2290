//! gRPC Server utilities.

use super::config::ServerConfig;
use tracing::info;

/// Helper for creating gRPC servers with health checks.
///
/// # Example
///
/// ```ignore
/// use grpc_client::server::{GrpcServer, ServerConfig};
/// use core_config::FromEnv;
///
/// let config = ServerConfig::from_env()?;
/// let (health_reporter, health_service) = create_health_service();
///
/// GrpcServer::setup_health(&health_reporter, rpc::LAPTOP_SERVICE_NAME).await;
/// GrpcServer::log_startup(&config, rpc::LAPTOP_SERVICE_NAME);
/// ```
pub struct GrpcServer;

impl GrpcServer {
    /// Log server startup information.
    pub fn log_startup(config: &ServerConfig, service_name: &str) {
        info!(
            addr = %config.addr_string(),
            service = service_name,
            compression = config.enable_compression,
            max_message_size = config.max_decoding_message_size,
            "gRPC server starting"
        );

        if config.enable_compression {
            info!("Zstd compression enabled");
        }

        info!("Health check service enabled (grpc.health.v1.Health)");
    }

    /// Set up health reporting for a service.
    ///
    /// Marks both the named service and the empty service name as serving
    /// (empty is what generic health probes ask for).
    pub async fn setup_health(
        health_reporter: &tonic_health::server::HealthReporter,
        service_name: &str,
    ) {
        health_reporter
            .set_service_status(service_name, tonic_health::ServingStatus::Serving)
            .await;
        health_reporter
            .set_service_status("", tonic_health::ServingStatus::Serving)
            .await;

        info!(service = service_name, "Service marked as serving");
    }
}

pub use tonic_health::server::health_reporter as create_health_service;
