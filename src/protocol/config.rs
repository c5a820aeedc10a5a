use std::time::Duration;

/// Well-known DICT port.
pub const DEFAULT_PORT: u16 = 2628;

/// Where and how to open a [`DictConnection`](super::DictConnection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Bound on establishing the TCP connection; `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
    /// Deadline on every socket read and write. Expiry closes the connection.
    pub read_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: None,
            read_timeout: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}
