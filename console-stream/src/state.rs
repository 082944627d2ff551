//! Shared console state
//!
//! All buffers live behind `parking_lot` locks so the rendering side gets
//! cheap synchronous read access. The dispatch task is the only writer for
//! stream-driven mutations; the bootstrap loaders run before the stream
//! starts, so there are never two writers racing.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use console_core::{
    ActivityFeed, AgentId, AgentSummary, AuthTier, Channel, ConnectionStatus, EventMarker,
    FeedItem, MarkerLog, PricePoint, PriceSeries, Roster,
};

use crate::config::StreamConfig;

/// Notification emitted after every state mutation
#[derive(Debug, Clone)]
pub enum StateChange {
    /// A market tick was folded into the series
    Price {
        value: Decimal,
        change_pct: Option<Decimal>,
    },
    /// A feed item was appended
    Feed { channel: Channel },
    /// The roster was wholesale-replaced
    RosterReplaced { agents: usize },
    /// An agent already in the roster was flagged eliminated
    AgentEliminated { name: String },
    /// An event marker was appended
    MarkerAdded { label: String },
    /// The connection changed state
    Status { status: ConnectionStatus },
    /// Authentication was acknowledged
    AuthAccepted { tier: AuthTier },
    /// The reconnect budget is spent; no further attempt will be made
    RetriesExhausted { attempts: u32 },
}

struct MarketState {
    series: PriceSeries,
    markers: MarkerLog,
}

struct ConnectionInfo {
    status: ConnectionStatus,
    tier: Option<AuthTier>,
    retries_exhausted: bool,
}

/// Bounded in-memory state derived from the message stream
pub struct ConsoleState {
    market: RwLock<MarketState>,
    feed: RwLock<ActivityFeed>,
    roster: RwLock<Roster>,
    connection: RwLock<ConnectionInfo>,
}

impl ConsoleState {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            market: RwLock::new(MarketState {
                series: PriceSeries::new(config.price_capacity),
                markers: MarkerLog::new(config.marker_capacity),
            }),
            feed: RwLock::new(ActivityFeed::new(config.feed_capacity)),
            roster: RwLock::new(Roster::new()),
            connection: RwLock::new(ConnectionInfo {
                status: ConnectionStatus::Disconnected,
                tier: None,
                retries_exhausted: false,
            }),
        }
    }

    // =========================================================================
    // Read accessors (rendering surface)
    // =========================================================================

    pub fn current_price(&self) -> Option<Decimal> {
        self.market.read().series.latest().map(|p| p.value)
    }

    pub fn change_pct(&self) -> Option<Decimal> {
        self.market.read().series.change_pct()
    }

    pub fn session_high(&self) -> Option<Decimal> {
        self.market.read().series.high()
    }

    pub fn session_low(&self) -> Option<Decimal> {
        self.market.read().series.low()
    }

    /// Retained price window, oldest first.
    pub fn price_series(&self) -> Vec<PricePoint> {
        self.market.read().series.to_vec()
    }

    pub fn price_series_len(&self) -> usize {
        self.market.read().series.len()
    }

    /// Event markers, oldest first.
    pub fn markers(&self) -> Vec<EventMarker> {
        self.market.read().markers.to_vec()
    }

    /// Feed items newest first, optionally filtered by channel.
    pub fn feed(&self, channel: Option<Channel>, limit: Option<usize>) -> Vec<FeedItem> {
        self.feed.read().snapshot(channel, limit)
    }

    /// The roster, best rank first.
    pub fn roster(&self) -> Vec<AgentSummary> {
        self.roster.read().to_vec()
    }

    pub fn agent(&self, id: AgentId) -> Option<AgentSummary> {
        self.roster.read().get(id).cloned()
    }

    pub fn agent_by_name(&self, name: &str) -> Option<AgentSummary> {
        self.roster.read().by_name(name).cloned()
    }

    pub fn roster_len(&self) -> usize {
        self.roster.read().len()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.read().status
    }

    pub fn auth_tier(&self) -> Option<AuthTier> {
        self.connection.read().tier
    }

    /// True once the reconnect budget is spent and the client has parked.
    pub fn retries_exhausted(&self) -> bool {
        self.connection.read().retries_exhausted
    }

    // =========================================================================
    // Mutations (dispatch + bootstrap)
    // =========================================================================

    pub(crate) fn record_price(&self, point: PricePoint) -> StateChange {
        let mut market = self.market.write();
        market.series.push(point);
        StateChange::Price {
            value: point.value,
            change_pct: market.series.change_pct(),
        }
    }

    pub(crate) fn append_feed(&self, item: FeedItem) -> StateChange {
        let channel = item.channel;
        self.feed.write().push(item);
        StateChange::Feed { channel }
    }

    pub(crate) fn add_marker(&self, observed_at: DateTime<Utc>, label: String) -> StateChange {
        self.market.write().markers.push(EventMarker {
            observed_at,
            label: label.clone(),
        });
        StateChange::MarkerAdded { label }
    }

    pub(crate) fn mark_eliminated(&self, name: &str) -> Option<StateChange> {
        if self.roster.write().mark_eliminated(name) {
            Some(StateChange::AgentEliminated {
                name: name.to_string(),
            })
        } else {
            None
        }
    }

    /// Swap the whole roster for the latest snapshot.
    pub fn replace_roster(&self, rankings: Vec<AgentSummary>) -> StateChange {
        let agents = rankings.len();
        self.roster.write().replace(rankings);
        StateChange::RosterReplaced { agents }
    }

    /// Replace the price window from a bulk history fetch (oldest first).
    /// Watermarks restart from the loaded records.
    pub fn load_price_history<I: IntoIterator<Item = PricePoint>>(&self, history: I) {
        self.market.write().series.reload(history);
    }

    /// Seed the feed from a history fetch, oldest first so the newest ends
    /// up at the head.
    pub fn seed_feed<I: IntoIterator<Item = FeedItem>>(&self, items: I) {
        let mut feed = self.feed.write();
        for item in items {
            feed.push(item);
        }
    }

    pub(crate) fn set_status(&self, status: ConnectionStatus) -> StateChange {
        self.connection.write().status = status;
        StateChange::Status { status }
    }

    pub(crate) fn set_auth_tier(&self, tier: AuthTier) -> StateChange {
        self.connection.write().tier = Some(tier);
        StateChange::AuthAccepted { tier }
    }

    pub(crate) fn set_retries_exhausted(&self, attempts: u32) -> StateChange {
        self.connection.write().retries_exhausted = true;
        StateChange::RetriesExhausted { attempts }
    }
}
