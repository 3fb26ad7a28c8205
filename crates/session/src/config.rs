use serde::{Deserialize, Serialize};

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the signed session
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Signing secrets. The first one signs new cookies, all of them are
    /// accepted when verifying, which allows rotating secrets without
    /// logging everybody out.
    #[serde(default)]
    pub secrets: Vec<String>,

    /// Whether to mark the cookie `Secure`
    #[serde(default)]
    pub secure: bool,

    /// Cookie lifetime in seconds, a browser-session cookie when unset
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl SessionConfig {
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secrets: vec![secret.into()],
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secrets: Vec::new(),
            secure: false,
            max_age_secs: None,
        }
    }
}

fn default_cookie_name() -> String {
    "__session".to_owned()
}
