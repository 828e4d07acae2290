pub mod config;

pub use config::{ChannelConfig, KeepAlive};

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Connect with [`ChannelConfig::default`]: 5s connect timeout, 30s
/// keep-alive pings and 1MB flow-control windows.
///
/// ## Example
/// ```ignore
/// use grpc_client::create_channel;
/// use rpc::laptop_service_client::LaptopServiceClient;
///
/// let channel = create_channel("http://[::1]:50051").await?;
/// let client = LaptopServiceClient::new(channel);
/// ```
pub async fn create_channel(addr: impl Into<String>) -> GrpcResult<Channel> {
  create_channel_with_config(addr, ChannelConfig::default()).await
}

/// Creates a gRPC channel with custom configuration
///
/// ## Example
/// ```ignore
/// use grpc_client::{create_channel_with_config, ChannelConfig};
/// use std::time::Duration;
///
/// let config = ChannelConfig::default()
///     .with_connect_timeout(Duration::from_secs(1));
///
/// let channel = create_channel_with_config("http://[::1]:50051", config).await?;
/// ```
pub async fn create_channel_with_config(
  addr: impl Into<String>,
  config: ChannelConfig,
) -> GrpcResult<Channel> {
  let addr_string = addr.into();

  let endpoint = Endpoint::from_shared(addr_string.clone()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr_string, error = ?e, "Invalid URI");
    GrpcError::InvalidUri(e)
  })?;

  let endpoint = config.apply_to_endpoint(endpoint);

  tracing::debug!(target: "grpc_client", addr = %addr_string, "Creating gRPC channel");

  endpoint.connect().await.map_err(|e| {
    tracing::error!(
      target: "grpc_client",
      addr = %addr_string,
      error = ?e,
      "Failed to connect to gRPC service"
    );
    GrpcError::ConnectionFailed(e)
  })
}
