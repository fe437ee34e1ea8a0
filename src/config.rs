//! Client configuration.

use std::env;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://kirpikapi.esmedddemo.com/api";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`crate::ApiClient`].
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token for admin and order endpoints, when one has already
    /// been obtained.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the environment, falling back to production
    /// defaults. A `.env` file is honored when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url =
            env::var("STOREFRONT_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = env::var("STOREFRONT_API_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let token = env::var("STOREFRONT_API_TOKEN").ok();
        Self {
            base_url,
            timeout_secs,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }
}
