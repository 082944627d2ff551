//! Wire protocol for the real-time connection
//!
//! These types define the messages exchanged with the game server's
//! WebSocket endpoint: a handful of control frames tagged by `type`, and
//! the channel-event envelope carrying everything else.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Channel;

// ============================================================================
// Client -> Server Messages
// ============================================================================

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticate; always the first frame after the transport opens
    Auth {
        /// Caller-supplied credential
        secret: String,
    },
    /// Subscribe to a channel
    Subscribe { channel: Channel },
    /// Unsubscribe from a channel
    Unsubscribe { channel: Channel },
    /// Keepalive ping
    Ping,
}

// ============================================================================
// Server -> Client Messages
// ============================================================================

/// Control frames sent from server to client (tagged by `type`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Authentication acknowledgment
    Auth { status: AuthTier },
    /// Keepalive ack
    Pong,
}

/// Access tier granted by the server after authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthTier {
    /// Full access, including admin-only channels
    Admin,
    /// Public channels only
    Observer,
}

/// Channel-event envelope
///
/// The channel arrives as a plain string so that channels this client does
/// not know about deserialize fine and can be ignored during dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEvent {
    pub channel: String,
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ChannelEvent {
    /// Resolve the envelope's channel against the known set.
    pub fn known_channel(&self) -> Option<Channel> {
        self.channel.parse().ok()
    }

    /// Event timestamp, falling back to the local clock when the field is
    /// absent or unparseable.
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now)
    }
}

/// Parse the server's ISO8601 timestamps.
///
/// The server emits naive UTC timestamps (`2026-02-01T12:34:56.789012`,
/// no offset), but an offset form is accepted too.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Connection status
// ============================================================================

/// Lifecycle state of the real-time connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// No transport; a reconnect may be pending
    Disconnected,
    /// Transport handshake in progress
    Connecting,
    /// Transport open, auth sent, ack not yet received
    Open,
    /// Auth acknowledged; subscriptions replayed
    Authenticated,
    /// Transport closed; about to transition to Disconnected
    Closed,
}

impl ConnectionStatus {
    /// True while the transport can carry frames.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Open | ConnectionStatus::Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_is_tagged_by_type() {
        let msg = ClientMessage::Auth {
            secret: "hunter2".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "auth");
        assert_eq!(json["secret"], "hunter2");
    }

    #[test]
    fn test_subscribe_frame_shape() {
        let msg = ClientMessage::Subscribe {
            channel: Channel::DarkMarket,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"subscribe","channel":"dark_market"}"#);
    }

    #[test]
    fn test_auth_ack_parses_both_tiers() {
        let admin: ControlMessage =
            serde_json::from_str(r#"{"type":"auth","status":"admin"}"#).unwrap();
        assert!(matches!(
            admin,
            ControlMessage::Auth {
                status: AuthTier::Admin
            }
        ));

        let observer: ControlMessage =
            serde_json::from_str(r#"{"type":"auth","status":"observer"}"#).unwrap();
        assert!(matches!(
            observer,
            ControlMessage::Auth {
                status: AuthTier::Observer
            }
        ));
    }

    #[test]
    fn test_pong_parses() {
        let msg: ControlMessage = serde_json::from_str(r#"{"type":"pong"}"#).unwrap();
        assert!(matches!(msg, ControlMessage::Pong));
    }

    #[test]
    fn test_envelope_with_unknown_channel_still_parses() {
        let event: ChannelEvent = serde_json::from_str(
            r#"{"channel":"orderbook","event_type":"depth","data":{},"timestamp":"2026-02-01T10:00:00.000123"}"#,
        )
        .unwrap();
        assert!(event.known_channel().is_none());
    }

    #[test]
    fn test_naive_timestamp_parses_as_utc() {
        let parsed = parse_timestamp("2026-02-01T10:30:00.500000").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_rfc3339_timestamp_parses() {
        assert!(parse_timestamp("2026-02-01T10:30:00+02:00").is_some());
    }

    #[test]
    fn test_garbage_timestamp_is_none() {
        assert!(parse_timestamp("yesterday-ish").is_none());
    }
}
