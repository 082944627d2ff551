//! Stream client configuration

use std::time::Duration;

use console_core::Channel;

/// Reconnect delay base
pub const RECONNECT_DELAY_BASE: Duration = Duration::from_secs(2);

/// Reconnect delay ceiling
pub const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(30);

/// Max reconnect attempts before the client parks
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Keepalive ping period
pub const PING_INTERVAL: Duration = Duration::from_secs(25);

/// Retained price points
pub const PRICE_CAPACITY: usize = 120;

/// Retained feed items
pub const FEED_CAPACITY: usize = 200;

/// Retained event markers
pub const MARKER_CAPACITY: usize = 256;

/// Configuration for the live update client
#[derive(Clone)]
pub struct StreamConfig {
    /// WebSocket endpoint of the game server
    pub endpoint: String,
    /// Admin credential; an empty or wrong secret yields observer tier
    pub secret: Option<String>,
    /// Channels replayed after every successful authentication
    pub channels: Vec<Channel>,
    pub price_capacity: usize,
    pub feed_capacity: usize,
    pub marker_capacity: usize,
    pub reconnect_base: Duration,
    pub reconnect_max: Duration,
    pub max_reconnect_attempts: u32,
    pub ping_interval: Duration,
}

impl std::fmt::Debug for StreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamConfig")
            .field("endpoint", &self.endpoint)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("channels", &self.channels)
            .field("price_capacity", &self.price_capacity)
            .field("feed_capacity", &self.feed_capacity)
            .field("marker_capacity", &self.marker_capacity)
            .field("reconnect_base", &self.reconnect_base)
            .field("reconnect_max", &self.reconnect_max)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("ping_interval", &self.ping_interval)
            .finish()
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("GAME_WS_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:8765".to_string()),
            secret: std::env::var("ADMIN_SECRET").ok(),
            channels: Channel::ALL.to_vec(),
            price_capacity: PRICE_CAPACITY,
            feed_capacity: FEED_CAPACITY,
            marker_capacity: MARKER_CAPACITY,
            reconnect_base: RECONNECT_DELAY_BASE,
            reconnect_max: RECONNECT_DELAY_MAX,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            ping_interval: PING_INTERVAL,
        }
    }
}

impl StreamConfig {
    /// Config pointing at an explicit endpoint, all channels subscribed.
    pub fn new(endpoint: impl Into<String>, secret: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            secret,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = StreamConfig::new("ws://localhost:8765", Some("hunter2".to_string()));
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_default_subscribes_every_channel() {
        let config = StreamConfig::new("ws://localhost:8765", None);
        assert_eq!(config.channels.len(), Channel::ALL.len());
    }
}
