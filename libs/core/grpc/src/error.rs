use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors that can occur during gRPC channel creation and server setup
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for connection
  #[error("Invalid URI: {0}")]
  InvalidUri(#[from] tonic::transport::Error),

  /// Failed to establish connection
  #[error("Connection failed: {0}")]
  ConnectionFailed(tonic::transport::Error),
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri(_) => tonic::Status::invalid_argument(err.to_string()),
      GrpcError::ConnectionFailed(_) => tonic::Status::unavailable(err.to_string()),
    }
  }
}

// ============================================================================
// Generic Error Conversion Traits
// ============================================================================

/// Extension trait for Result types to convert errors to tonic::Status
///
/// Conversions in the domain crates report malformed input as plain
/// `String` errors; this turns them into `INVALID_ARGUMENT` at the handler.
///
/// # Example
/// ```ignore
/// use grpc_client::error::ToTonicResult;
///
/// let filter: Filter = request.filter.try_into().to_tonic()?;
/// ```
pub trait ToTonicResult<T> {
  /// Convert the error in this Result to a tonic::Status with INVALID_ARGUMENT code
  fn to_tonic(self) -> Result<T, tonic::Status>;
}

impl<T> ToTonicResult<T> for Result<T, String> {
  fn to_tonic(self) -> Result<T, tonic::Status> {
    self.map_err(tonic::Status::invalid_argument)
  }
}

/// Extension trait for Option types to convert None to tonic::Status errors
///
/// # Example
/// ```ignore
/// use grpc_client::error::ToTonicOption;
///
/// let laptop = request.laptop.ok_or_invalid("laptop is required")?;
/// ```
pub trait ToTonicOption<T> {
  /// Convert None to a tonic::Status with INVALID_ARGUMENT code
  fn ok_or_invalid(self, message: impl Into<String>) -> Result<T, tonic::Status>;
}

impl<T> ToTonicOption<T> for Option<T> {
  fn ok_or_invalid(self, message: impl Into<String>) -> Result<T, tonic::Status> {
    self.ok_or_else(|| tonic::Status::invalid_argument(message.into()))
  }
}
