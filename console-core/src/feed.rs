//! Bounded activity feed
//!
//! Feed items keep their structured payload; `summary()` renders the
//! operator-facing line for each channel, but any rendering layer can read
//! the payload directly instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

use crate::Channel;

/// One entry in the activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub channel: Channel,
    pub kind: String,
    pub payload: Value,
    pub observed_at: DateTime<Utc>,
    /// Display hint carried on the wire ("green", "red", ...)
    pub color: Option<String>,
}

impl FeedItem {
    /// Human-readable one-liner in the reference dashboard's wording.
    pub fn summary(&self) -> String {
        let p = &self.payload;
        match (self.channel, self.kind.as_str()) {
            (Channel::Market, _) => format!(
                "price €{} ({}%)",
                field(p, "price_eur"),
                field(p, "change_pct")
            ),
            (Channel::Trades, "scam_detected") => format!(
                "SCAM: {} → {} ({} AFC)",
                field(p, "sender"),
                field(p, "receiver"),
                field(p, "amount")
            ),
            (Channel::Trades, "leverage_bet") => format!(
                "{} leverages {} AFC {}",
                field(p, "agent"),
                field(p, "amount"),
                field(p, "direction")
            ),
            (Channel::Trades, _) => format!(
                "{} → {}: {} AFC @ €{}",
                field(p, "sender"),
                field(p, "receiver"),
                field(p, "amount"),
                field(p, "price_eur")
            ),
            (Channel::Social, _) => format!(
                "{} [{}]: {}",
                field(p, "author"),
                field(p, "post_type"),
                field(p, "preview")
            ),
            (Channel::Alliances, kind) => format!(
                "{}: {} ({})",
                kind,
                field(p, "agent"),
                field(p, "alliance")
            ),
            (Channel::Eliminations, _) => format!(
                "{} eliminated at hour {} with {} AFC",
                field(p, "agent"),
                field(p, "hour"),
                field(p, "final_afc")
            ),
            (Channel::Events, _) => format!(
                "{}: {}",
                field(p, "event_type"),
                field(p, "description")
            ),
            (Channel::Whispers, _) | (Channel::Admin, "whisper_sent") => format!(
                "whisper {} → {}",
                field(p, "sender_id"),
                field(p, "receiver_id")
            ),
            (Channel::DarkMarket, kind) => format!("dark market {}", kind),
            (Channel::AgentDecisions, _) => format!(
                "{} decided {}: {}",
                field(p, "agent"),
                field(p, "action_type"),
                field(p, "reasoning")
            ),
            (Channel::Leaderboard, _) => "leaderboard updated".to_string(),
            (Channel::Admin, kind) => format!("admin: {}", kind),
        }
    }
}

/// Render a payload field for display; objects and arrays compact to JSON.
fn field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Bounded newest-first activity log
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    items: VecDeque<FeedItem>,
    capacity: usize,
}

impl ActivityFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the head; the oldest item falls off the tail once full.
    pub fn push(&mut self, item: FeedItem) {
        if self.items.len() == self.capacity {
            self.items.pop_back();
        }
        self.items.push_front(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items newest first.
    pub fn iter(&self) -> impl Iterator<Item = &FeedItem> {
        self.items.iter()
    }

    /// Newest-first snapshot, optionally restricted to one channel.
    pub fn snapshot(&self, channel: Option<Channel>, limit: Option<usize>) -> Vec<FeedItem> {
        let filtered = self
            .items
            .iter()
            .filter(|item| channel.map_or(true, |ch| item.channel == ch))
            .cloned();
        match limit {
            Some(limit) => filtered.take(limit).collect(),
            None => filtered.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(channel: Channel, kind: &str, payload: Value) -> FeedItem {
        FeedItem {
            channel,
            kind: kind.to_string(),
            payload,
            observed_at: Utc::now(),
            color: None,
        }
    }

    #[test]
    fn test_feed_is_bounded_and_newest_first() {
        let mut feed = ActivityFeed::new(3);
        for i in 0..5 {
            feed.push(item(Channel::Trades, "trade_completed", json!({ "n": i })));
        }

        assert_eq!(feed.len(), 3);
        let order: Vec<i64> = feed
            .iter()
            .map(|it| it.payload["n"].as_i64().unwrap())
            .collect();
        assert_eq!(order, vec![4, 3, 2]);
    }

    #[test]
    fn test_snapshot_filters_by_channel() {
        let mut feed = ActivityFeed::new(10);
        feed.push(item(Channel::Trades, "trade_completed", json!({})));
        feed.push(item(Channel::Social, "new_post", json!({})));
        feed.push(item(Channel::Trades, "trade_completed", json!({})));

        assert_eq!(feed.snapshot(Some(Channel::Trades), None).len(), 2);
        assert_eq!(feed.snapshot(Some(Channel::Social), None).len(), 1);
        assert_eq!(feed.snapshot(None, Some(2)).len(), 2);
    }

    #[test]
    fn test_trade_summary_wording() {
        let it = item(
            Channel::Trades,
            "trade_completed",
            json!({"sender": "VULTURE", "receiver": "ORACLE", "amount": 2.5, "price_eur": 931.0}),
        );
        assert_eq!(it.summary(), "VULTURE → ORACLE: 2.5 AFC @ €931.0");
    }

    #[test]
    fn test_scam_summary_wording() {
        let it = item(
            Channel::Trades,
            "scam_detected",
            json!({"sender": "VULTURE", "receiver": "ORACLE", "amount": 2.5}),
        );
        assert!(it.summary().starts_with("SCAM: VULTURE → ORACLE"));
    }

    #[test]
    fn test_elimination_summary_wording() {
        let it = item(
            Channel::Eliminations,
            "agent_eliminated",
            json!({"agent": "PHANTOM", "hour": 14, "final_afc": 0.3}),
        );
        assert_eq!(it.summary(), "PHANTOM eliminated at hour 14 with 0.3 AFC");
    }

    #[test]
    fn test_missing_payload_fields_render_placeholder() {
        let it = item(Channel::Social, "new_post", json!({}));
        assert_eq!(it.summary(), "? [?]: ?");
    }
}
