//! Server configuration loaded from environment variables.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use std::net::SocketAddr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 50051;
const DEFAULT_MAX_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Configuration for gRPC server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Port to listen on (default: 50051)
    pub port: u16,
    /// Accept and send Zstd-compressed messages (default: true)
    pub enable_compression: bool,
    /// Maximum message size for decoding (default: 4MB)
    pub max_decoding_message_size: usize,
    /// Maximum message size for encoding (default: 4MB)
    pub max_encoding_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            enable_compression: true,
            max_decoding_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_encoding_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl FromEnv for ServerConfig {
    /// Reads:
    /// - `GRPC_HOST` (default: 0.0.0.0)
    /// - `GRPC_PORT` (default: 50051)
    /// - `GRPC_COMPRESSION` (default: true)
    /// - `GRPC_MAX_MESSAGE_SIZE` (default: 4194304 / 4MB)
    ///
    /// Unparseable values are errors rather than silent defaults.
    fn from_env() -> Result<Self, ConfigError> {
        let max_message_size = env_parse_or("GRPC_MAX_MESSAGE_SIZE", DEFAULT_MAX_MESSAGE_SIZE)?;

        Ok(Self {
            host: env_or_default("GRPC_HOST", DEFAULT_HOST),
            port: env_parse_or("GRPC_PORT", DEFAULT_PORT)?,
            enable_compression: env_parse_or("GRPC_COMPRESSION", true)?,
            max_decoding_message_size: max_message_size,
            max_encoding_message_size: max_message_size,
        })
    }
}

impl ServerConfig {
    /// Create a new server config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host to bind to.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port to listen on.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable or disable compression.
    pub fn with_compression(mut self, enable: bool) -> Self {
        self.enable_compression = enable;
        self
    }

    /// Set maximum message size.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_decoding_message_size = size;
        self.max_encoding_message_size = size;
        self
    }

    /// Get the socket address to bind to.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.addr_string().parse()
    }

    /// Get the address string (for logging).
    pub fn addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
