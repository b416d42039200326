use crate::config::default_port;

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

/// Embedded web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the embedded web server.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Loopback address the server binds to. Never exposed beyond localhost.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}
