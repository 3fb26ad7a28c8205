//! Daemon configuration

use core::net::SocketAddr;
use std::env;
use std::fs::read_to_string;
use std::path::Path;

use eyre::{bail, eyre, Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use storefront_cart::{CartConfig, RollbackPolicy};
use storefront_commerce::CommerceConfig;
use storefront_server::config::{ServerConfig, DEFAULT_ADDR};
use storefront_session::SessionConfig;
use url::Url;

/// Everything `storefrontd` needs to serve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Address to listen on for incoming HTTP requests
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub cart: CartConfig,

    /// Remote commerce API, required unless serving the mock catalogue
    #[serde(default)]
    pub commerce: Option<CommerceConfig>,

    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

const fn default_listen() -> SocketAddr {
    DEFAULT_ADDR
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_ADDR,
            session: SessionConfig::default(),
            cart: CartConfig::default(),
            commerce: None,
            allowed_origins: Vec::new(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a TOML file, or JSON if the extension says so
    pub fn load(path: &Path) -> EyreResult<Self> {
        let content = read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> EyreResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EyreResult<Self> {
        let mut config = Self::default();

        if let Some(secrets) = lookup("SESSION_SECRET") {
            config.session.secrets = secrets
                .split(',')
                .map(str::trim)
                .filter(|secret| !secret.is_empty())
                .map(ToOwned::to_owned)
                .collect();
        }

        if let Some(secure) = lookup("SESSION_SECURE") {
            config.session.secure = matches!(secure.trim(), "1" | "true" | "yes");
        }

        if let Some(store_url) = lookup("PUBLIC_STORE_URL") {
            let store_url: Url = store_url
                .parse()
                .wrap_err("PUBLIC_STORE_URL is not a valid URL")?;

            let mut commerce = CommerceConfig::new(store_url);
            commerce.storefront_api_token = lookup("PUBLIC_STOREFRONT_API_TOKEN");
            config.commerce = Some(commerce);
        }

        if let Some(port) = lookup("PORT") {
            config
                .listen
                .set_port(port.trim().parse().wrap_err("PORT is not a valid port")?);
        }

        if let Some(listen) = lookup("STOREFRONT_LISTEN") {
            config.listen = listen
                .parse()
                .wrap_err("STOREFRONT_LISTEN is not a valid socket address")?;
        }

        if let Some(max_quantity) = lookup("STOREFRONT_MAX_QUANTITY") {
            config.cart.max_quantity = max_quantity
                .parse()
                .wrap_err("STOREFRONT_MAX_QUANTITY is not a number")?;
        }

        if let Some(rollback) = lookup("STOREFRONT_ROLLBACK") {
            config.cart.rollback = rollback.parse::<RollbackPolicy>().map_err(|err| eyre!(err))?;
        }

        Ok(config)
    }

    /// Rejects configurations the service cannot start with
    pub fn validate(&self, mock: bool) -> EyreResult<()> {
        if self.session.secrets.is_empty() {
            bail!("SESSION_SECRET environment variable is not set");
        }

        if !mock && self.commerce.is_none() {
            bail!("Missing PUBLIC_STORE_URL, set it or run with --mock");
        }

        if self.cart.max_quantity == 0 {
            bail!("Maximum line quantity must be at least 1");
        }

        Ok(())
    }

    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(self.listen, self.session.clone(), self.cart);
        config.allowed_origins.clone_from(&self.allowed_origins);
        config
    }
}
