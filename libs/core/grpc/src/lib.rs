//! # gRPC Library
//!
//! Shared gRPC plumbing for the pcbook server and client.
//!
//! ## Features
//!
//! - **Channel Creation**: HTTP/2 tuned channels for the CLI client
//! - **Server Helpers**: environment-driven server config, health reporting
//!   and startup logging
//! - **Deadlines**: `grpc-timeout` header parsing so handlers can honour the
//!   caller's deadline inside long-running loops
//! - **Error Adapters**: `ToTonicResult` / `ToTonicOption` for mapping plain
//!   errors into `tonic::Status`
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::create_channel;
//! use rpc::laptop_service_client::LaptopServiceClient;
//!
//! let channel = create_channel("http://[::1]:50051").await?;
//! let client = LaptopServiceClient::new(channel);
//! ```

pub mod channel;
pub mod conversions;
pub mod deadline;
pub mod error;
pub mod server;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, KeepAlive, create_channel, create_channel_with_config};
pub use deadline::{GRPC_TIMEOUT_HEADER, parse_grpc_timeout, request_timeout};
pub use error::{GrpcError, GrpcResult, ToTonicOption, ToTonicResult};
