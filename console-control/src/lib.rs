//! Control and query client for the game admin console
//!
//! Wraps the game server's REST surface: read-only catch-up queries used
//! to bootstrap console state, and the privileged admin actions. The live
//! event stream lives in `console-stream`; this crate only does
//! request/response.

pub mod admin;
pub mod client;
pub mod types;

pub use admin::{AdminClient, Confirm};
pub use client::GameClient;
pub use types::{
    AdminOutcome, ApiEnvelope, DecisionRecord, DecisionsData, FeedData, FeedPost,
    ForceEliminationRequest, GameStateData, GaslightingRequest, LeaderboardData,
    ModifyBalanceRequest, ModifyReputationRequest, PriceData, PriceRecord,
    SendFakeWhisperRequest, TriggerEventRequest,
};
