//! Live update client
//!
//! Owns the WebSocket connection to the game server: authenticates first
//! thing after the transport opens, replays the channel subscriptions on
//! every auth ack, folds inbound events into [`ConsoleState`], pings on a
//! fixed period, and reconnects with exponential backoff until the attempt
//! budget is spent.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

use console_core::{Channel, ClientMessage, ConnectionStatus, ConsoleError, ControlMessage};

use crate::backoff::Backoff;
use crate::config::StreamConfig;
use crate::dispatch::{apply_event, classify, Inbound};
use crate::state::{ConsoleState, StateChange};

/// Commands sent to the connection task
#[derive(Debug)]
pub enum ClientCommand {
    Subscribe(Channel),
    Unsubscribe(Channel),
    Shutdown,
}

/// How a live session ended
enum SessionEnd {
    /// Transport closed or errored; the reconnect path takes over
    Closed,
    /// Shutdown was requested; no reconnect
    Shutdown,
}

/// Live update client with an explicit start/shutdown lifecycle
pub struct LiveClient {
    config: StreamConfig,
    state: Arc<ConsoleState>,
    /// Channels replayed after each auth ack; shared with the task so
    /// runtime subscribes survive a reconnect
    subscriptions: Arc<RwLock<Vec<Channel>>>,
    /// Change notifications for the rendering side
    change_tx: broadcast::Sender<StateChange>,
    /// Command sender to the connection task; present while running
    command_tx: Option<mpsc::Sender<ClientCommand>>,
}

impl LiveClient {
    /// Create a new client. State buffers are sized from the config.
    pub fn new(config: StreamConfig) -> (Self, broadcast::Receiver<StateChange>) {
        let (change_tx, change_rx) = broadcast::channel(1024);
        let state = Arc::new(ConsoleState::new(&config));
        let subscriptions = Arc::new(RwLock::new(config.channels.clone()));

        (
            Self {
                config,
                state,
                subscriptions,
                change_tx,
                command_tx: None,
            },
            change_rx,
        )
    }

    /// Shared state handle for the rendering side.
    pub fn state(&self) -> Arc<ConsoleState> {
        Arc::clone(&self.state)
    }

    /// Get another change-notification receiver.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChange> {
        self.change_tx.subscribe()
    }

    /// Start the connection task. No-op if the client is already running.
    pub fn start(&mut self) -> Result<(), ConsoleError> {
        if self.command_tx.is_some() {
            debug!("[Stream] start() ignored, client already running");
            return Ok(());
        }

        Url::parse(&self.config.endpoint)
            .map_err(|e| ConsoleError::config(format!("Bad endpoint '{}': {}", self.config.endpoint, e)))?;

        let (command_tx, command_rx) = mpsc::channel::<ClientCommand>(100);
        self.command_tx = Some(command_tx);

        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        let subscriptions = Arc::clone(&self.subscriptions);
        let change_tx = self.change_tx.clone();

        tokio::spawn(async move {
            connection_loop(config, state, subscriptions, change_tx, command_rx).await;
        });

        Ok(())
    }

    /// Ask the connection task to stop. Safe to call when not running.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(ClientCommand::Shutdown).await;
        }
    }

    /// Subscribe to an additional channel; also joins the replay set.
    pub async fn subscribe(&self, channel: Channel) {
        {
            let mut subs = self.subscriptions.write();
            if !subs.contains(&channel) {
                subs.push(channel);
            }
        }
        if let Some(ref tx) = self.command_tx {
            let _ = tx.send(ClientCommand::Subscribe(channel)).await;
        }
    }

    /// Unsubscribe from a channel and drop it from the replay set.
    pub async fn unsubscribe(&self, channel: Channel) {
        self.subscriptions.write().retain(|c| *c != channel);
        if let Some(ref tx) = self.command_tx {
            let _ = tx.send(ClientCommand::Unsubscribe(channel)).await;
        }
    }
}

impl std::fmt::Debug for LiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClient")
            .field("config", &self.config)
            .field("running", &self.command_tx.is_some())
            .finish()
    }
}

fn emit(change_tx: &broadcast::Sender<StateChange>, change: StateChange) {
    // Nobody listening is fine; state is still readable.
    let _ = change_tx.send(change);
}

/// Main connection loop with reconnection logic
async fn connection_loop(
    config: StreamConfig,
    state: Arc<ConsoleState>,
    subscriptions: Arc<RwLock<Vec<Channel>>>,
    change_tx: broadcast::Sender<StateChange>,
    mut command_rx: mpsc::Receiver<ClientCommand>,
) {
    let mut backoff = Backoff::new(
        config.reconnect_base,
        config.reconnect_max,
        config.max_reconnect_attempts,
    );

    loop {
        emit(&change_tx, state.set_status(ConnectionStatus::Connecting));
        info!("[Stream] Connecting to {}", config.endpoint);

        match connect_async(config.endpoint.as_str()).await {
            Ok((ws_stream, _)) => {
                info!("[Stream] Connected");
                backoff.reset();
                emit(&change_tx, state.set_status(ConnectionStatus::Open));

                let end = run_session(
                    ws_stream,
                    &config,
                    &state,
                    &subscriptions,
                    &change_tx,
                    &mut command_rx,
                )
                .await;

                emit(&change_tx, state.set_status(ConnectionStatus::Closed));

                if matches!(end, SessionEnd::Shutdown) {
                    emit(&change_tx, state.set_status(ConnectionStatus::Disconnected));
                    info!("[Stream] Shut down");
                    return;
                }
            }
            Err(e) => {
                error!("[Stream] Connection failed: {}", e);
            }
        }

        emit(&change_tx, state.set_status(ConnectionStatus::Disconnected));

        match backoff.next_delay() {
            Some(delay) => {
                info!(
                    "[Stream] Reconnecting in {:?} (attempt {})",
                    delay,
                    backoff.attempts()
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    cmd = command_rx.recv() => match cmd {
                        Some(ClientCommand::Shutdown) | None => {
                            info!("[Stream] Shut down while waiting to reconnect");
                            return;
                        }
                        // Subscription edits just update the replay set;
                        // the next session replays it in full.
                        Some(_) => {}
                    }
                }
            }
            None => {
                error!(
                    "[Stream] Giving up after {} reconnect attempts; manual restart required",
                    backoff.attempts()
                );
                emit(&change_tx, state.set_retries_exhausted(backoff.attempts()));
                return;
            }
        }
    }
}

/// Drive one live session until the transport drops or shutdown arrives.
async fn run_session(
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    config: &StreamConfig,
    state: &ConsoleState,
    subscriptions: &RwLock<Vec<Channel>>,
    change_tx: &broadcast::Sender<StateChange>,
    command_rx: &mut mpsc::Receiver<ClientCommand>,
) -> SessionEnd {
    let (mut write, mut read) = ws_stream.split();

    // Auth is always the very first frame after the transport opens.
    let auth = ClientMessage::Auth {
        secret: config.secret.clone().unwrap_or_default(),
    };
    if !send_frame(&mut write, &auth).await {
        return SessionEnd::Closed;
    }

    let mut ping_timer = interval(config.ping_interval);
    // The first interval tick completes immediately; consume it so the
    // first ping goes out one full period after connect.
    ping_timer.tick().await;

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match classify(&text) {
                            Some(Inbound::Control(ControlMessage::Auth { status })) => {
                                info!("[Stream] Authenticated as {:?}", status);
                                emit(change_tx, state.set_status(ConnectionStatus::Authenticated));
                                emit(change_tx, state.set_auth_tier(status));

                                // Subscriptions do not survive the server side
                                // of a reconnect; replay the full set.
                                let channels: Vec<Channel> = subscriptions.read().clone();
                                for channel in channels {
                                    let frame = ClientMessage::Subscribe { channel };
                                    if !send_frame(&mut write, &frame).await {
                                        return SessionEnd::Closed;
                                    }
                                }
                            }
                            Some(Inbound::Control(ControlMessage::Pong)) => {
                                debug!("[Stream] Pong");
                            }
                            Some(Inbound::Event(event)) => {
                                for change in apply_event(state, event) {
                                    emit(change_tx, change);
                                }
                            }
                            None => {}
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            warn!("[Stream] Failed to send pong: {}", e);
                            return SessionEnd::Closed;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("[Stream] Connection closed by server");
                        return SessionEnd::Closed;
                    }
                    Some(Err(e)) => {
                        error!("[Stream] Transport error: {}", e);
                        return SessionEnd::Closed;
                    }
                    None => {
                        info!("[Stream] Stream ended");
                        return SessionEnd::Closed;
                    }
                    _ => {}
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(ClientCommand::Subscribe(channel)) => {
                        let frame = ClientMessage::Subscribe { channel };
                        if !send_frame(&mut write, &frame).await {
                            return SessionEnd::Closed;
                        }
                    }
                    Some(ClientCommand::Unsubscribe(channel)) => {
                        let frame = ClientMessage::Unsubscribe { channel };
                        if !send_frame(&mut write, &frame).await {
                            return SessionEnd::Closed;
                        }
                    }
                    Some(ClientCommand::Shutdown) | None => {
                        return SessionEnd::Shutdown;
                    }
                }
            }

            _ = ping_timer.tick() => {
                // Keepalive only matters once the server accepted us.
                if state.status() == ConnectionStatus::Authenticated {
                    if !send_frame(&mut write, &ClientMessage::Ping).await {
                        return SessionEnd::Closed;
                    }
                }
            }
        }
    }
}

/// Serialize and send one frame; false means the session is over.
async fn send_frame<S>(write: &mut S, frame: &ClientMessage) -> bool
where
    S: futures_util::Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            error!("[Stream] Failed to serialize frame: {}", e);
            return false;
        }
    };
    match write.send(Message::Text(json.into())).await {
        Ok(()) => true,
        Err(e) => {
            warn!("[Stream] Failed to send frame: {}", e);
            false
        }
    }
}
