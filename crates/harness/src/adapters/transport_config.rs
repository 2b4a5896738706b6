//! Transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wisent_domain::serde_util::duration_millis;

/// Settings for the default pooled HTTP transport.
///
/// Durations (de)serialize as milliseconds. Missing fields take their
/// defaults, so a partial settings file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Maximum time to establish a connection.
    #[serde(with = "duration_millis")]
    pub connect_timeout: Duration,
    /// Maximum time for a whole request, body included.
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
    /// Maximum time between two reads while waiting for the response.
    #[serde(with = "duration_millis")]
    pub read_timeout: Duration,
    /// How long an idle pooled connection is kept.
    #[serde(with = "duration_millis")]
    pub pool_idle_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// TCP keep-alive interval.
    #[serde(with = "duration_millis")]
    pub tcp_keepalive: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(3),
            read_timeout: Duration::from_secs(3),
            pool_idle_timeout: Duration::from_secs(3),
            pool_max_idle_per_host: 10,
            tcp_keepalive: Duration::from_secs(10),
            user_agent: concat!("wisent/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_bounded() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert!(config.user_agent.starts_with("wisent/"));
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"request_timeout": 500, "pool_max_idle_per_host": 32}"#)
                .unwrap();

        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.pool_max_idle_per_host, 32);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
    }
}
