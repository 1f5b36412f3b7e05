use std::time::Duration;

use crate::config::{env_duration_millis, env_string};

/// Connection settings for the upstream forum API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("HEX_UPSTREAM_URL", "https://hexbear.net"),
            request_timeout: env_duration_millis("HEX_UPSTREAM_TIMEOUT_MS", 30_000),
            user_agent: env_string("HEX_USER_AGENT", "hex-cache/0.1"),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
