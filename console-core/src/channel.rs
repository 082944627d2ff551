//! Channel definitions for the real-time event stream

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named event channels pushed by the game server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Price ticks and volume for the simulated coin
    Market,
    /// Agent-to-agent trades, scam detections, leverage bets
    Trades,
    /// Posts on the in-game social feed
    Social,
    /// Alliance formation, joins, betrayals
    Alliances,
    /// Agent eliminations
    Eliminations,
    /// Scripted and custom system events
    Events,
    /// Private message notifications (admin tier only)
    Whispers,
    /// Blackmail, hit contracts, intel purchases
    DarkMarket,
    /// Raw agent decision traces
    AgentDecisions,
    /// Full ranking snapshots
    Leaderboard,
    /// Administrative notices
    Admin,
}

impl Channel {
    /// Every channel, in the order subscriptions are replayed after auth.
    pub const ALL: [Channel; 11] = [
        Channel::Market,
        Channel::Trades,
        Channel::Social,
        Channel::Alliances,
        Channel::Eliminations,
        Channel::Events,
        Channel::Whispers,
        Channel::DarkMarket,
        Channel::AgentDecisions,
        Channel::Leaderboard,
        Channel::Admin,
    ];

    /// The wire name of the channel
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Market => "market",
            Channel::Trades => "trades",
            Channel::Social => "social",
            Channel::Alliances => "alliances",
            Channel::Eliminations => "eliminations",
            Channel::Events => "events",
            Channel::Whispers => "whispers",
            Channel::DarkMarket => "dark_market",
            Channel::AgentDecisions => "agent_decisions",
            Channel::Leaderboard => "leaderboard",
            Channel::Admin => "admin",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(Channel::Market),
            "trades" => Ok(Channel::Trades),
            "social" => Ok(Channel::Social),
            "alliances" => Ok(Channel::Alliances),
            "eliminations" => Ok(Channel::Eliminations),
            "events" => Ok(Channel::Events),
            "whispers" => Ok(Channel::Whispers),
            "dark_market" => Ok(Channel::DarkMarket),
            "agent_decisions" => Ok(Channel::AgentDecisions),
            "leaderboard" => Ok(Channel::Leaderboard),
            "admin" => Ok(Channel::Admin),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for channel in Channel::ALL {
            let parsed: Channel = channel.as_str().parse().unwrap();
            assert_eq!(parsed, channel);
        }
    }

    #[test]
    fn test_unknown_channel_is_an_error() {
        assert!("orderbook".parse::<Channel>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Channel::DarkMarket).unwrap();
        assert_eq!(json, "\"dark_market\"");
        let channel: Channel = serde_json::from_str("\"agent_decisions\"").unwrap();
        assert_eq!(channel, Channel::AgentDecisions);
    }
}
