//! Server configuration.

use std::net::SocketAddr;

/// Server network configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address and port to listen on.
    pub listen: SocketAddr,
}

impl ServerConfig {
    /// Create a new ServerConfig.
    pub fn new(listen: SocketAddr) -> Self {
        Self { listen }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}
