//! Response envelope and payload types for the game server API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use console_core::{parse_timestamp, AgentSummary, PricePoint};

/// Standard `{status, message, data}` envelope wrapping every response
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Current game state snapshot
#[derive(Debug, Clone, Deserialize)]
pub struct GameStateData {
    #[serde(default)]
    pub game_started_at: Option<String>,
    #[serde(default)]
    pub game_ends_at: Option<String>,
    pub current_hour: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_trading_frozen: bool,
    #[serde(default)]
    pub agents_remaining: Option<i64>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub is_market_frozen: Option<bool>,
}

/// Leaderboard payload
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardData {
    pub leaderboard: Vec<AgentSummary>,
}

/// One historical price record
#[derive(Debug, Clone, Deserialize)]
pub struct PriceRecord {
    pub price_eur: Decimal,
    #[serde(default)]
    pub buy_volume: Option<Decimal>,
    #[serde(default)]
    pub sell_volume: Option<Decimal>,
    #[serde(default)]
    pub volatility: Option<Decimal>,
    #[serde(default)]
    pub event_impact: Option<String>,
    #[serde(default)]
    pub recorded_at: Option<String>,
}

impl PriceRecord {
    /// Recorded timestamp, local clock if absent or unparseable.
    pub fn recorded_at_utc(&self) -> DateTime<Utc> {
        self.recorded_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(Utc::now)
    }

    pub fn to_price_point(&self) -> PricePoint {
        PricePoint::new(self.price_eur, self.recorded_at_utc())
    }
}

/// Price endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct PriceData {
    pub current_price: Decimal,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub buy_volume: Option<Decimal>,
    #[serde(default)]
    pub sell_volume: Option<Decimal>,
    /// Newest first, as served
    #[serde(default)]
    pub history: Vec<PriceRecord>,
    #[serde(default)]
    pub order_book: Value,
}

/// One social feed post
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPost {
    pub id: i64,
    pub author_id: i64,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub post_type: Option<String>,
    pub content: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Feed endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct FeedData {
    #[serde(default)]
    pub posts: Vec<FeedPost>,
    #[serde(default)]
    pub total: Option<i64>,
}

/// Decision history entry for one agent
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRecord {
    pub id: i64,
    pub decision_number: i64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub action_details: Value,
    pub reasoning: String,
    #[serde(default)]
    pub emotional_markers: Value,
    #[serde(default)]
    pub execution_success: bool,
    #[serde(default)]
    pub execution_notes: Option<String>,
    #[serde(default)]
    pub balance_after: Option<Decimal>,
    #[serde(default)]
    pub reputation_after: Option<i32>,
}

/// Decisions endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionsData {
    pub agent_id: i64,
    #[serde(default)]
    pub agent_name: Option<String>,
    pub decisions: Vec<DecisionRecord>,
}

/// Outcome of an administrative action
#[derive(Debug, Clone)]
pub struct AdminOutcome {
    pub message: String,
    pub data: Value,
}

// ============================================================================
// Admin request bodies
// ============================================================================

/// Event trigger: an existing scheduled event by id, or a custom one
#[derive(Debug, Clone, Serialize)]
pub struct TriggerEventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_impact: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl TriggerEventRequest {
    /// Trigger an already-scheduled event.
    pub fn by_id(event_id: i64) -> Self {
        Self {
            event_id: Some(event_id),
            event_type: None,
            description: None,
            price_impact: None,
            duration_minutes: None,
        }
    }

    /// Create and immediately trigger a custom event.
    pub fn custom(
        event_type: impl Into<String>,
        description: impl Into<String>,
        price_impact: Decimal,
        duration_minutes: Option<i64>,
    ) -> Self {
        Self {
            event_id: None,
            event_type: Some(event_type.into()),
            description: Some(description.into()),
            price_impact: Some(price_impact),
            duration_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyBalanceRequest {
    pub agent_id: i64,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModifyReputationRequest {
    pub agent_id: i64,
    pub change: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForceEliminationRequest {
    pub agent_id: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendFakeWhisperRequest {
    pub target_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaslightingRequest {
    pub agent_id: i64,
    pub fake_balance: Decimal,
}
