//! Core types for the game admin console
//!
//! This crate defines the shared data structures used across the console,
//! including the real-time wire protocol, bounded price/feed history, and
//! the agent roster.

pub mod agent;
pub mod channel;
pub mod error;
pub mod feed;
pub mod market;
pub mod protocol;

pub use agent::{AgentId, AgentSummary, EmotionalGauges, Roster};
pub use channel::Channel;
pub use error::{ConsoleError, ConsoleResult};
pub use feed::{ActivityFeed, FeedItem};
pub use market::{EventMarker, MarkerLog, PricePoint, PriceSeries};
pub use protocol::{
    AuthTier, ChannelEvent, ClientMessage, ConnectionStatus, ControlMessage, parse_timestamp,
};
