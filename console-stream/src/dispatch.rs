//! Inbound message classification and state folding
//!
//! Dispatch is deliberately tolerant: anything that does not parse is
//! dropped with a debug log, unknown channels are ignored, and no path in
//! here can panic the connection task.

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, trace};

use console_core::{AgentSummary, ChannelEvent, Channel, ControlMessage, FeedItem, PricePoint};

use crate::state::{ConsoleState, StateChange};

/// A frame the connection task knows what to do with
#[derive(Debug)]
pub(crate) enum Inbound {
    Control(ControlMessage),
    Event(ChannelEvent),
}

/// Classify a raw text frame. `None` means "drop it".
pub(crate) fn classify(text: &str) -> Option<Inbound> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            debug!("Dropping non-JSON frame: {}", e);
            return None;
        }
    };

    if value.get("type").is_some() {
        match serde_json::from_value::<ControlMessage>(value) {
            Ok(msg) => Some(Inbound::Control(msg)),
            Err(e) => {
                debug!("Dropping unrecognized control frame: {}", e);
                None
            }
        }
    } else if value.get("channel").is_some() {
        match serde_json::from_value::<ChannelEvent>(value) {
            Ok(event) => Some(Inbound::Event(event)),
            Err(e) => {
                debug!("Dropping malformed envelope: {}", e);
                None
            }
        }
    } else {
        debug!("Dropping frame with neither 'type' nor 'channel'");
        None
    }
}

#[derive(Debug, Deserialize)]
struct MarketTick {
    price_eur: Decimal,
}

#[derive(Debug, Deserialize)]
struct EliminationNotice {
    agent: String,
    #[serde(default)]
    hour: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct LeaderboardSnapshot {
    rankings: Vec<AgentSummary>,
}

#[derive(Debug, Deserialize)]
struct SystemEventNotice {
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Fold one channel event into the state, returning the notifications to
/// emit. An empty vec means the event was ignored.
pub(crate) fn apply_event(state: &ConsoleState, event: ChannelEvent) -> Vec<StateChange> {
    let Some(channel) = event.known_channel() else {
        trace!("Ignoring event on unknown channel '{}'", event.channel);
        return Vec::new();
    };

    let observed_at = event.observed_at();
    let mut changes = Vec::new();

    match channel {
        Channel::Market => {
            let tick: MarketTick = match serde_json::from_value(event.data.clone()) {
                Ok(tick) => tick,
                Err(e) => {
                    debug!("Dropping market event without a price: {}", e);
                    return Vec::new();
                }
            };
            changes.push(state.record_price(PricePoint::new(tick.price_eur, observed_at)));
        }

        Channel::Leaderboard => {
            let snapshot: LeaderboardSnapshot = match serde_json::from_value(event.data.clone()) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    debug!("Dropping leaderboard event without rankings: {}", e);
                    return Vec::new();
                }
            };
            changes.push(state.replace_roster(snapshot.rankings));
        }

        Channel::Eliminations => {
            changes.push(state.append_feed(feed_item(channel, &event, observed_at)));

            if let Ok(notice) =
                serde_json::from_value::<EliminationNotice>(event.data.clone())
            {
                let label = match notice.hour {
                    Some(hour) => format!("{} eliminated (hour {})", notice.agent, hour),
                    None => format!("{} eliminated", notice.agent),
                };
                changes.push(state.add_marker(observed_at, label));
                if let Some(change) = state.mark_eliminated(&notice.agent) {
                    changes.push(change);
                }
            }
        }

        Channel::Events => {
            changes.push(state.append_feed(feed_item(channel, &event, observed_at)));

            if let Ok(notice) = serde_json::from_value::<SystemEventNotice>(event.data.clone()) {
                let label = notice
                    .description
                    .or(notice.event_type)
                    .unwrap_or_else(|| event.event_type.clone());
                changes.push(state.add_marker(observed_at, label));
            }
        }

        Channel::Trades
        | Channel::Social
        | Channel::Alliances
        | Channel::Whispers
        | Channel::DarkMarket
        | Channel::AgentDecisions
        | Channel::Admin => {
            changes.push(state.append_feed(feed_item(channel, &event, observed_at)));
        }
    }

    changes
}

fn feed_item(
    channel: Channel,
    event: &ChannelEvent,
    observed_at: chrono::DateTime<chrono::Utc>,
) -> FeedItem {
    FeedItem {
        channel,
        kind: event.event_type.clone(),
        payload: event.data.clone(),
        observed_at,
        color: event.color.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use console_core::{AuthTier, ConnectionStatus};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn state() -> ConsoleState {
        ConsoleState::new(&StreamConfig::new("ws://localhost:8765", None))
    }

    fn event(channel: &str, event_type: &str, data: serde_json::Value) -> ChannelEvent {
        ChannelEvent {
            channel: channel.to_string(),
            event_type: event_type.to_string(),
            data,
            timestamp: Some("2026-02-01T10:00:00.000000".to_string()),
            color: None,
        }
    }

    fn ranking_row(id: i64, name: &str, rank: u32) -> serde_json::Value {
        json!({
            "rank": rank,
            "agent_id": id,
            "name": name,
            "role": "alpha",
            "afc_balance": 10.0,
            "reputation": 50,
            "is_eliminated": false
        })
    }

    #[test]
    fn test_classify_control_frames() {
        assert!(matches!(
            classify(r#"{"type":"pong"}"#),
            Some(Inbound::Control(ControlMessage::Pong))
        ));
        assert!(matches!(
            classify(r#"{"type":"auth","status":"admin"}"#),
            Some(Inbound::Control(ControlMessage::Auth {
                status: AuthTier::Admin
            }))
        ));
    }

    #[test]
    fn test_classify_drops_garbage() {
        assert!(classify("not json at all {{{").is_none());
        assert!(classify(r#"{"type":"mystery"}"#).is_none());
        assert!(classify(r#"{"hello":"world"}"#).is_none());
    }

    #[test]
    fn test_market_fold_scenario() {
        let state = state();
        for price in [100, 105, 98] {
            let changes = apply_event(
                &state,
                event("market", "price_update", json!({ "price_eur": price })),
            );
            assert_eq!(changes.len(), 1);
        }

        assert_eq!(state.current_price(), Some(dec!(98)));
        assert_eq!(state.session_high(), Some(dec!(105)));
        assert_eq!(state.session_low(), Some(dec!(98)));
        assert_eq!(state.price_series_len(), 3);
        // Market ticks do not produce feed items.
        assert!(state.feed(None, None).is_empty());
    }

    #[test]
    fn test_market_event_without_price_is_dropped() {
        let state = state();
        let changes = apply_event(&state, event("market", "price_update", json!({})));
        assert!(changes.is_empty());
        assert!(state.current_price().is_none());
    }

    #[test]
    fn test_trade_event_appends_feed() {
        let state = state();
        let changes = apply_event(
            &state,
            event(
                "trades",
                "trade_completed",
                json!({"sender": "A", "receiver": "B", "amount": 1.0, "price_eur": 930.0}),
            ),
        );
        assert_eq!(changes.len(), 1);
        let feed = state.feed(None, None);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, "trade_completed");
    }

    #[test]
    fn test_elimination_marks_roster_and_adds_marker() {
        let state = state();
        state.replace_roster(
            serde_json::from_value(json!([ranking_row(1, "ORACLE", 1), ranking_row(2, "VULTURE", 2)]))
                .unwrap(),
        );

        let changes = apply_event(
            &state,
            event(
                "eliminations",
                "agent_eliminated",
                json!({"agent": "VULTURE", "hour": 14, "final_afc": 0.2, "redistribution": {}}),
            ),
        );

        // Feed item, marker, and the roster flag.
        assert_eq!(changes.len(), 3);
        assert_eq!(state.roster_len(), 2);
        assert!(state.agent_by_name("VULTURE").unwrap().eliminated);
        assert_eq!(state.markers().len(), 1);
        assert_eq!(state.feed(None, None).len(), 1);
    }

    #[test]
    fn test_elimination_of_unknown_agent_still_feeds_and_marks() {
        let state = state();
        let changes = apply_event(
            &state,
            event(
                "eliminations",
                "agent_eliminated",
                json!({"agent": "GHOST", "hour": 3}),
            ),
        );
        assert_eq!(changes.len(), 2);
        assert_eq!(state.markers().len(), 1);
    }

    #[test]
    fn test_system_event_adds_marker() {
        let state = state();
        apply_event(
            &state,
            event(
                "events",
                "system_event",
                json!({"event_type": "flash_crash", "description": "Flash crash!", "price_impact_pct": -20.0}),
            ),
        );
        let markers = state.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].label, "Flash crash!");
        assert_eq!(state.feed(None, None).len(), 1);
    }

    #[test]
    fn test_leaderboard_wholesale_replace() {
        let state = state();
        state.replace_roster(
            serde_json::from_value(json!([ranking_row(1, "ORACLE", 1)])).unwrap(),
        );

        let changes = apply_event(
            &state,
            event(
                "leaderboard",
                "leaderboard_update",
                json!({"rankings": [ranking_row(2, "VULTURE", 1), ranking_row(3, "PHANTOM", 2)]}),
            ),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(state.roster_len(), 2);
        assert!(state.agent_by_name("ORACLE").is_none());
    }

    #[test]
    fn test_empty_leaderboard_empties_roster() {
        let state = state();
        state.replace_roster(
            serde_json::from_value(json!([ranking_row(1, "ORACLE", 1)])).unwrap(),
        );

        apply_event(
            &state,
            event("leaderboard", "leaderboard_update", json!({"rankings": []})),
        );
        assert_eq!(state.roster_len(), 0);
    }

    #[test]
    fn test_unknown_channel_is_ignored() {
        let state = state();
        let changes = apply_event(&state, event("orderbook", "depth", json!({})));
        assert!(changes.is_empty());
        assert!(state.feed(None, None).is_empty());
    }

    #[test]
    fn test_malformed_then_valid_messages() {
        let state = state();
        assert!(classify("]]]").is_none());
        apply_event(
            &state,
            event("market", "price_update", json!({"price_eur": 930.5})),
        );
        assert_eq!(state.current_price(), Some(dec!(930.5)));
        assert_eq!(state.status(), ConnectionStatus::Disconnected);
    }
}
