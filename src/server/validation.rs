//! Production configuration validation
//!
//! Security checks for production deployments.

use super::config::AppConfig;
use tracing::warn;

/// Warn about risky settings when `FINCHAT_ENV=production`
pub fn validate_production_config(config: &AppConfig) {
    let is_production = std::env::var("FINCHAT_ENV")
        .map(|v| v.to_lowercase() == "production")
        .unwrap_or(false);

    if !is_production {
        return;
    }

    if config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    if !config.server.rate_limit.enabled {
        warn!("SECURITY WARNING: Rate limiting is DISABLED in production.");
    }
}
