//! gRPC Server Builder
//!
//! Environment-driven configuration, health reporting and startup logging
//! for tonic servers.
//!
//! ```ignore
//! use grpc_client::server::{GrpcServer, ServerConfig, create_health_service};
//! use core_config::FromEnv;
//! use tonic::transport::Server;
//!
//! let config = ServerConfig::from_env()?;
//! let (health_reporter, health_service) = create_health_service();
//!
//! GrpcServer::setup_health(&health_reporter, rpc::LAPTOP_SERVICE_NAME).await;
//! GrpcServer::log_startup(&config, rpc::LAPTOP_SERVICE_NAME);
//!
//! Server::builder()
//!     .add_service(health_service)
//!     .add_service(LaptopServiceServer::new(my_impl))
//!     .serve(config.socket_addr()?)
//!     .await?;
//! ```

mod builder;
mod config;

pub use builder::{GrpcServer, create_health_service};
pub use config::ServerConfig;
