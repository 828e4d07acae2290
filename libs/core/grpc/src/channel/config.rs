use std::time::Duration;
use tonic::Request;
use tonic::transport::Endpoint;

/// HTTP/2 PING settings for idle client connections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
  pub interval: Duration,
  pub timeout: Duration,
  pub while_idle: bool,
}

impl Default for KeepAlive {
  fn default() -> Self {
    Self {
      interval: Duration::from_secs(30),
      timeout: Duration::from_secs(10),
      while_idle: true,
    }
  }
}

/// Client channel settings
///
/// `call_deadline` is not an endpoint setting: tonic only sends
/// `grpc-timeout` for deadlines set on the request, so callers stamp it
/// with [`ChannelConfig::request`].
#[derive(Debug, Clone)]
pub struct ChannelConfig {
  pub connect_timeout: Duration,
  pub keep_alive: Option<KeepAlive>,
  /// Connection and stream flow-control window, in bytes
  pub window_size: Option<u32>,
  pub tcp_nodelay: bool,
  pub call_deadline: Option<Duration>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      connect_timeout: Duration::from_secs(5),
      keep_alive: Some(KeepAlive::default()),
      window_size: Some(1024 * 1024), // one full-size image per window
      tcp_nodelay: true,
      call_deadline: None,
    }
  }
}

impl ChannelConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Deadline stamped on every request built with [`ChannelConfig::request`]
  ///
  /// # Example
  /// ```ignore
  /// let config = ChannelConfig::new().with_call_deadline(Duration::from_secs(5));
  /// let request = config.request(CreateLaptopRequest { laptop: Some(laptop) });
  /// ```
  pub fn with_call_deadline(mut self, deadline: Duration) -> Self {
    self.call_deadline = Some(deadline);
    self
  }

  pub fn with_keep_alive(mut self, keep_alive: KeepAlive) -> Self {
    self.keep_alive = Some(keep_alive);
    self
  }

  pub fn without_keep_alive(mut self) -> Self {
    self.keep_alive = None;
    self
  }

  /// Wrap `message` in a request carrying the call deadline, if any
  pub fn request<T>(&self, message: T) -> Request<T> {
    let mut request = Request::new(message);
    if let Some(deadline) = self.call_deadline {
      request.set_timeout(deadline);
    }
    request
  }

  pub(crate) fn apply_to_endpoint(&self, mut endpoint: Endpoint) -> Endpoint {
    endpoint = endpoint
      .connect_timeout(self.connect_timeout)
      .tcp_nodelay(self.tcp_nodelay);

    if let Some(keep_alive) = self.keep_alive {
      endpoint = endpoint
        .http2_keep_alive_interval(keep_alive.interval)
        .keep_alive_timeout(keep_alive.timeout)
        .keep_alive_while_idle(keep_alive.while_idle);
    }

    match self.window_size {
      Some(size) => endpoint
        .initial_connection_window_size(size)
        .initial_stream_window_size(size),
      None => endpoint.http2_adaptive_window(true),
    }
  }
}
