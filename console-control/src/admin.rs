//! Administrative action client
//!
//! Every call carries the `X-Admin-Secret` header and returns the server's
//! message plus any action payload. Failures map to
//! [`ConsoleError::Action`] with the action name attached; nothing is
//! retried automatically.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use console_core::ConsoleError;

use crate::types::{
    AdminOutcome, ApiEnvelope, ForceEliminationRequest, GaslightingRequest, ModifyBalanceRequest,
    ModifyReputationRequest, SendFakeWhisperRequest, TriggerEventRequest,
};

/// Admin secret header name
const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Explicit confirmation for actions that cannot be undone.
///
/// Stopping the simulation or force-eliminating an agent requires passing
/// `Confirm::Yes` at the call site; there is no default, so the intent has
/// to be spelled out wherever the request is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Yes,
}

/// Client for the privileged admin endpoints
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
    secret: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl AdminClient {
    /// Create an admin client with an explicit base URL and credential.
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConsoleError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.into(),
        })
    }

    /// Create an admin client from `GAME_API_URL` and `ADMIN_SECRET`.
    pub fn from_env() -> Result<Self, ConsoleError> {
        let base =
            std::env::var("GAME_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let secret = std::env::var("ADMIN_SECRET")
            .map_err(|_| ConsoleError::config("ADMIN_SECRET is not set"))?;
        Self::new(base, secret)
    }

    /// POST an admin action and unwrap the response envelope.
    async fn post_action<B: Serialize>(
        &self,
        action: &str,
        path: &str,
        body: Option<&B>,
    ) -> Result<AdminOutcome, ConsoleError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Admin action '{}' -> {}", action, url);

        let mut request = self
            .client
            .post(&url)
            .header(ADMIN_SECRET_HEADER, &self.secret);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConsoleError::action(action, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ConsoleError::action(
                action,
                format!("HTTP {}: {}", status, body),
            ));
        }

        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ConsoleError::action(action, format!("bad response: {}", e)))?;

        if !envelope.is_ok() {
            return Err(ConsoleError::action(
                action,
                envelope
                    .message
                    .unwrap_or_else(|| format!("server returned status '{}'", envelope.status)),
            ));
        }

        Ok(AdminOutcome {
            message: envelope.message.unwrap_or_default(),
            data: envelope.data.unwrap_or(serde_json::Value::Null),
        })
    }

    /// Start the game loop.
    #[instrument(skip(self))]
    pub async fn start_game(&self) -> Result<AdminOutcome, ConsoleError> {
        self.post_action::<()>("start", "/admin/start", None).await
    }

    /// Stop the game loop. Irreversible for the running session.
    #[instrument(skip(self))]
    pub async fn stop_game(&self, _confirm: Confirm) -> Result<AdminOutcome, ConsoleError> {
        self.post_action::<()>("stop", "/admin/stop", None).await
    }

    /// Freeze all trading.
    #[instrument(skip(self))]
    pub async fn freeze_trading(&self) -> Result<AdminOutcome, ConsoleError> {
        self.post_action::<()>("freeze-trading", "/admin/freeze-trading", None)
            .await
    }

    /// Unfreeze trading.
    #[instrument(skip(self))]
    pub async fn unfreeze_trading(&self) -> Result<AdminOutcome, ConsoleError> {
        self.post_action::<()>("unfreeze-trading", "/admin/unfreeze-trading", None)
            .await
    }

    /// Trigger a scheduled event by id, or create and fire a custom one.
    #[instrument(skip(self, request))]
    pub async fn trigger_event(
        &self,
        request: &TriggerEventRequest,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("trigger-event", "/admin/trigger-event", Some(request))
            .await
    }

    /// Directly adjust an agent's coin balance.
    #[instrument(skip(self, request))]
    pub async fn modify_balance(
        &self,
        request: &ModifyBalanceRequest,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("modify-balance", "/admin/modify-balance", Some(request))
            .await
    }

    /// Adjust an agent's reputation score.
    #[instrument(skip(self, request))]
    pub async fn modify_reputation(
        &self,
        request: &ModifyReputationRequest,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("modify-reputation", "/admin/modify-reputation", Some(request))
            .await
    }

    /// Eliminate an agent regardless of balance or schedule. Irreversible.
    #[instrument(skip(self, request))]
    pub async fn force_elimination(
        &self,
        request: &ForceEliminationRequest,
        _confirm: Confirm,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("force-elimination", "/admin/force-elimination", Some(request))
            .await
    }

    /// Send an anonymous whisper to an agent from a random other agent.
    #[instrument(skip(self, request))]
    pub async fn send_fake_whisper(
        &self,
        request: &SendFakeWhisperRequest,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("send-fake-whisper", "/admin/send-fake-whisper", Some(request))
            .await
    }

    /// Whisper fake balance information to an agent.
    #[instrument(skip(self, request))]
    pub async fn gaslighting(
        &self,
        request: &GaslightingRequest,
    ) -> Result<AdminOutcome, ConsoleError> {
        self.post_action("gaslighting", "/admin/gaslighting", Some(request))
            .await
    }
}
