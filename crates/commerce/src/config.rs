use serde::{Deserialize, Serialize};
use url::Url;

use crate::retry::RetryPolicy;

/// Commerce API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// GraphQL endpoint of the storefront API
    pub store_url: Url,

    /// Public storefront access token, sent as `X-Shopify-Storefront-Access-Token`
    #[serde(default)]
    pub storefront_api_token: Option<String>,

    /// Timeout and retry behaviour for every remote call
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl CommerceConfig {
    #[must_use]
    pub fn new(store_url: Url) -> Self {
        Self {
            store_url,
            storefront_api_token: None,
            retry: RetryPolicy::default(),
        }
    }
}
