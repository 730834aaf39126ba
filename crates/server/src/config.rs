use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 6878; // MUST in T9

pub const DEFAULT_LISTEN: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT);

/// Listener configuration for the HTTP service.
#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub const fn new(listen: SocketAddr) -> Self {
        Self { listen }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LISTEN)
    }
}
