use std::fmt;

use crate::config::NetConfig;

pub const DEFAULT_BIND_IP: &str = "127.0.0.1";
pub const WILDCARD_BIND_IP: &str = "0.0.0.0";
pub const DEFAULT_LISTEN_PORT: u16 = 9000;

/// Address and port the server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindTarget {
    pub host: String,
    pub port: u16,
}

impl Default for BindTarget {
    fn default() -> Self {
        Self {
            host: DEFAULT_BIND_IP.to_string(),
            port: DEFAULT_LISTEN_PORT,
        }
    }
}

impl BindTarget {
    /// Loopback unless `listen_to_network` is explicitly true; then
    /// `bind_ip`, or all interfaces when it is not set.
    pub fn from_net(net: &NetConfig) -> Self {
        let mut target = Self::default();

        if let Some(port) = net.listen_port {
            target.port = port;
        }
        if net.listen_to_network == Some(true) {
            target.host = net
                .bind_ip
                .clone()
                .unwrap_or_else(|| WILDCARD_BIND_IP.to_string());
        }
        target
    }
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
