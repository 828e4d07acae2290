//! gRPC server initialization and lifecycle management
//!
//! - Tracing initialization
//! - Store selection (in-memory or on-disk images)
//! - gRPC server configuration, health service and graceful shutdown

use std::future::Future;

use core_config::storage::{ImageBackend, ImageStoreConfig};
use core_config::{Environment, FromEnv};
use domain_laptops::{
    DiskImageStore, ImageStore, InMemoryImageStore, InMemoryLaptopStore, InMemoryRatingStore,
    LaptopService,
};
use eyre::{Result, WrapErr};
use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
use rpc::laptop_service_server::LaptopServiceServer;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tracing::{info, warn};

use crate::service::LaptopServiceImpl;

/// Run the gRPC server until Ctrl-C
///
/// # Errors
///
/// Returns an error if configuration is invalid, the image directory cannot
/// be created, the address cannot be bound or the server fails while running.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let config = ServerConfig::from_env().wrap_err("Failed to load server configuration")?;
    let images = ImageStoreConfig::from_env().wrap_err("Failed to load image store configuration")?;

    let addr = config
        .socket_addr()
        .wrap_err_with(|| format!("Failed to parse server address: {}", config.addr_string()))?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;

    serve(config, images, listener, shutdown_signal()).await
}

/// Serve the laptop service on an already bound listener until `shutdown` resolves
pub async fn serve<F>(
    config: ServerConfig,
    images: ImageStoreConfig,
    listener: TcpListener,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    match images.backend {
        ImageBackend::Memory => {
            info!("Storing images in memory");
            serve_with_images(config, InMemoryImageStore::new(), listener, shutdown).await
        }
        ImageBackend::Disk => {
            let store = DiskImageStore::open(&images.dir)
                .await
                .wrap_err_with(|| format!("Failed to open image folder {}", images.dir.display()))?;
            info!(dir = %images.dir.display(), "Storing images on disk");
            serve_with_images(config, store, listener, shutdown).await
        }
    }
}

async fn serve_with_images<I, F>(
    config: ServerConfig,
    images: I,
    listener: TcpListener,
    shutdown: F,
) -> Result<()>
where
    I: ImageStore + 'static,
    F: Future<Output = ()> + Send,
{
    let service = LaptopService::new(
        InMemoryLaptopStore::new(),
        images,
        InMemoryRatingStore::new(),
    );

    let (health_reporter, health_service) = create_health_service();
    GrpcServer::setup_health(&health_reporter, rpc::LAPTOP_SERVICE_NAME).await;
    GrpcServer::log_startup(&config, rpc::LAPTOP_SERVICE_NAME);

    let mut laptops = LaptopServiceServer::new(LaptopServiceImpl::new(service))
        .max_decoding_message_size(config.max_decoding_message_size)
        .max_encoding_message_size(config.max_encoding_message_size);
    if config.enable_compression {
        laptops = laptops
            .accept_compressed(CompressionEncoding::Zstd)
            .send_compressed(CompressionEncoding::Zstd);
    }

    if let Ok(local) = listener.local_addr() {
        info!(addr = %local, "LaptopService listening");
    }

    Server::builder()
        .add_service(health_service)
        .add_service(laptops)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await
        .wrap_err("gRPC server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
