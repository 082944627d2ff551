//! Game Admin Console
//!
//! Headless operator console: bootstraps state from the game server's REST
//! API, then follows the live event stream and prints feed lines as they
//! arrive. Rendering surfaces (chart, tables) read the same state handle.

use chrono::Utc;
use console_control::GameClient;
use console_core::{parse_timestamp, Channel, FeedItem};
use console_stream::{LiveClient, StateChange, StreamConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,console_app=debug")),
        )
        .init();

    info!("Starting game admin console");

    let stream_config = StreamConfig::default();
    if stream_config.secret.is_none() {
        info!("No ADMIN_SECRET set - connecting as observer");
    }

    let (mut client, mut changes) = LiveClient::new(stream_config);
    let state = client.state();

    // Bootstrap from the REST catch-up endpoints before going live. Each
    // step is best-effort: a missing backend still leaves a working stream
    // client that fills state as events arrive.
    let game_api = GameClient::from_env()?;
    bootstrap(&game_api, &state).await;

    client.start()?;

    loop {
        tokio::select! {
            change = changes.recv() => {
                match change {
                    Ok(change) => render_change(&state, &change),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Renderer lagged, {} notifications dropped", skipped);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                client.shutdown().await;
                break;
            }
        }
    }

    Ok(())
}

/// Rebuild state from the REST surface: price history, roster, recent feed.
async fn bootstrap(game_api: &GameClient, state: &console_stream::ConsoleState) {
    match game_api.price_history(120).await {
        Ok(price) => {
            // The endpoint serves newest first; the series wants oldest first.
            let mut points: Vec<_> = price.history.iter().map(|r| r.to_price_point()).collect();
            points.reverse();
            let loaded = points.len();
            state.load_price_history(points);
            info!(
                "Loaded {} price records, current price €{}",
                loaded, price.current_price
            );
        }
        Err(e) => warn!("Price history bootstrap failed: {}", e),
    }

    match game_api.leaderboard().await {
        Ok(rankings) => {
            let count = rankings.len();
            state.replace_roster(rankings);
            info!("Loaded roster with {} agents", count);
        }
        Err(e) => warn!("Leaderboard bootstrap failed: {}", e),
    }

    match game_api.feed(50, 0, None).await {
        Ok(feed) => {
            let count = feed.posts.len();
            // The endpoint serves newest first; seed oldest first so the
            // newest post ends up at the head of the feed.
            let items: Vec<FeedItem> = feed
                .posts
                .iter()
                .rev()
                .map(|post| FeedItem {
                    channel: Channel::Social,
                    kind: "new_post".to_string(),
                    payload: serde_json::json!({
                        "author": post.author_name,
                        "post_id": post.id,
                        "post_type": post.post_type,
                        "preview": post.content.chars().take(100).collect::<String>(),
                    }),
                    observed_at: post
                        .created_at
                        .as_deref()
                        .and_then(parse_timestamp)
                        .unwrap_or_else(Utc::now),
                    color: Some("blue".to_string()),
                })
                .collect();
            state.seed_feed(items);
            info!("Seeded feed with {} posts", count);
        }
        Err(e) => warn!("Feed bootstrap failed: {}", e),
    }
}

/// Print one line per notification, the way the dashboard panes would
/// redraw from the same state handle.
fn render_change(state: &console_stream::ConsoleState, change: &StateChange) {
    match change {
        StateChange::Price { value, change_pct } => {
            let pct = change_pct
                .map(|p| format!("{:.2}%", p))
                .unwrap_or_else(|| "--".to_string());
            info!(
                "price €{} ({})  high €{}  low €{}",
                value,
                pct,
                state
                    .session_high()
                    .map(|h| h.to_string())
                    .unwrap_or_else(|| "--".to_string()),
                state
                    .session_low()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "--".to_string()),
            );
        }
        StateChange::Feed { channel } => {
            if let Some(item) = state.feed(Some(*channel), Some(1)).into_iter().next() {
                info!("[{}] {}", channel, item.summary());
            }
        }
        StateChange::RosterReplaced { agents } => {
            info!("leaderboard updated ({} agents)", agents);
        }
        StateChange::AgentEliminated { name } => {
            info!("agent eliminated: {}", name);
        }
        StateChange::MarkerAdded { label } => {
            info!("event marker: {}", label);
        }
        StateChange::Status { status } => {
            info!("connection: {:?}", status);
        }
        StateChange::AuthAccepted { tier } => {
            info!("authenticated as {:?}", tier);
        }
        StateChange::RetriesExhausted { attempts } => {
            warn!(
                "gave up reconnecting after {} attempts - restart the console to resume",
                attempts
            );
        }
    }
}
