//! Game server query client
//!
//! Read-only REST surface: game state, leaderboard, price history, social
//! feed, events, eliminations, and per-agent queries. These are the
//! catch-up calls the console runs on startup before the live stream takes
//! over.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use console_core::{AgentSummary, ConsoleError};

use crate::types::{
    ApiEnvelope, DecisionsData, FeedData, GameStateData, LeaderboardData, PriceData,
};

/// Default game server API base
const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only client for the game server API
#[derive(Debug, Clone)]
pub struct GameClient {
    client: Client,
    base_url: String,
}

impl GameClient {
    /// Create a client against an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConsoleError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from `GAME_API_URL`, falling back to localhost.
    pub fn from_env() -> Result<Self, ConsoleError> {
        let base = std::env::var("GAME_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self::new(base)
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and unwrap the `{status, message, data}` envelope.
    pub(crate) async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ConsoleError::network(format!("Failed to fetch {}: {}", path, e)))?;

        if response.status().as_u16() == 404 {
            return Err(ConsoleError::not_found(format!("{} returned 404", path)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ConsoleError::api(format!(
                "Game API error ({}): {}",
                status, body
            )));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ConsoleError::parse(format!("Failed to parse {} response: {}", path, e)))?;

        if !envelope.is_ok() {
            return Err(ConsoleError::api(
                envelope
                    .message
                    .unwrap_or_else(|| format!("{} returned status '{}'", path, envelope.status)),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ConsoleError::parse(format!("{} returned no data", path)))
    }

    /// Current game state (hour, phase, agents remaining, live price).
    #[instrument(skip(self))]
    pub async fn game_state(&self) -> Result<GameStateData, ConsoleError> {
        self.get_data("/game/state").await
    }

    /// Current leaderboard, best rank first.
    #[instrument(skip(self))]
    pub async fn leaderboard(&self) -> Result<Vec<AgentSummary>, ConsoleError> {
        let data: LeaderboardData = self.get_data("/game/leaderboard").await?;
        Ok(data.leaderboard)
    }

    /// Current price plus recent history (newest first), `limit` 1..=500.
    #[instrument(skip(self))]
    pub async fn price_history(&self, limit: u32) -> Result<PriceData, ConsoleError> {
        self.get_data(&format!("/game/price?limit={}", limit.clamp(1, 500)))
            .await
    }

    /// Social feed page, optionally filtered by post type.
    #[instrument(skip(self))]
    pub async fn feed(
        &self,
        limit: u32,
        offset: u32,
        post_type: Option<&str>,
    ) -> Result<FeedData, ConsoleError> {
        let mut path = format!("/game/feed?limit={}&offset={}", limit.clamp(1, 100), offset);
        if let Some(post_type) = post_type {
            path.push_str(&format!("&post_type={}", post_type));
        }
        self.get_data(&path).await
    }

    /// All system events and their status.
    #[instrument(skip(self))]
    pub async fn events(&self) -> Result<serde_json::Value, ConsoleError> {
        self.get_data("/game/events").await
    }

    /// Full elimination history.
    #[instrument(skip(self))]
    pub async fn eliminations(&self) -> Result<serde_json::Value, ConsoleError> {
        self.get_data("/game/eliminations").await
    }

    /// Detailed status for one agent, including emotional gauges.
    #[instrument(skip(self))]
    pub async fn agent(&self, agent_id: i64) -> Result<AgentSummary, ConsoleError> {
        self.get_data(&format!("/agents/{}", agent_id)).await
    }

    /// Decision history for one agent, newest first, `limit` 1..=100.
    #[instrument(skip(self))]
    pub async fn agent_decisions(
        &self,
        agent_id: i64,
        limit: u32,
    ) -> Result<DecisionsData, ConsoleError> {
        self.get_data(&format!(
            "/agents/{}/decisions?limit={}",
            agent_id,
            limit.clamp(1, 100)
        ))
        .await
    }
}
