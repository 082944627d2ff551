//! Agent roster types
//!
//! The roster mirrors the latest leaderboard broadcast: it is replaced
//! wholesale on every snapshot rather than merged, so it always reflects
//! exactly what the server last said.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Agent identifier assigned by the game server
pub type AgentId = i64;

/// 0-100 emotional gauges from the agent model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalGauges {
    #[serde(default, alias = "stress_level")]
    pub stress: u8,
    #[serde(default)]
    pub confidence: u8,
    #[serde(default)]
    pub paranoia: u8,
    #[serde(default)]
    pub aggression: u8,
    #[serde(default)]
    pub guilt: u8,
}

/// One agent's entry in the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSummary {
    #[serde(alias = "agent_id")]
    pub id: AgentId,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "afc_balance")]
    pub balance: Decimal,
    pub reputation: i32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(rename = "is_eliminated", default)]
    pub eliminated: bool,
    /// Present on per-agent detail responses, absent on leaderboard rows
    #[serde(flatten)]
    pub emotions: EmotionalGauges,
}

/// Current agent roster, keyed by id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: HashMap<AgentId, AgentSummary>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a fresh ranking snapshot. An empty snapshot empties the
    /// roster; nothing from the previous snapshot survives.
    pub fn replace(&mut self, rankings: Vec<AgentSummary>) {
        self.agents = rankings.into_iter().map(|a| (a.id, a)).collect();
    }

    /// Flag an agent as eliminated, matched by name (the elimination
    /// broadcast carries names, not ids). Returns false if unknown.
    pub fn mark_eliminated(&mut self, name: &str) -> bool {
        match self.agents.values_mut().find(|a| a.name == name) {
            Some(agent) => {
                agent.eliminated = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentSummary> {
        self.agents.get(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&AgentSummary> {
        self.agents.values().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// All agents, best rank first.
    pub fn to_vec(&self) -> Vec<AgentSummary> {
        let mut agents: Vec<AgentSummary> = self.agents.values().cloned().collect();
        agents.sort_by_key(|a| a.rank);
        agents
    }
}
