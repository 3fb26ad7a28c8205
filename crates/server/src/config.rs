use core::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};
use storefront_cart::CartConfig;
use storefront_session::SessionConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT);

#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub cart: CartConfig,

    /// Origins allowed to call the action endpoints from a browser, any
    /// origin when empty.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(listen: SocketAddr, session: SessionConfig, cart: CartConfig) -> Self {
        Self {
            listen,
            session,
            cart,
            allowed_origins: Vec::new(),
        }
    }
}

const fn default_listen() -> SocketAddr {
    DEFAULT_ADDR
}
