use crate::error::{AgentError, Result};
use crate::messages::{Message, NotificationKind};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Identifies the page (tab) a message is addressed to.
pub type TargetId = u32;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 1000;
const INJECTION_SETTLE: Duration = Duration::from_millis(500);

/// Process boundary to the page-resident script. `send` resolves to the
/// script's reply or errors when nothing answers; `inject` loads the script
/// into the page.
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn send(&self, target: TargetId, message: &Message) -> anyhow::Result<Value>;
    async fn inject(&self, target: TargetId) -> anyhow::Result<()>;
}

/// Lifecycle of the page-resident script as observed from this side of the
/// boundary. Only the bridge mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    Unknown,
    Injecting,
    Verified,
    Unreachable,
}

pub struct ContentScriptBridge<T: PageTransport> {
    transport: Arc<T>,
    status: ScriptStatus,
}

impl<T: PageTransport> ContentScriptBridge<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            status: ScriptStatus::Unknown,
        }
    }

    pub fn status(&self) -> ScriptStatus {
        self.status
    }

    /// Ping/pong liveness check. A target that does not answer is "not
    /// alive"; that is an observation, not an exceptional condition.
    pub async fn verify_alive(&self, target: TargetId) -> bool {
        self.transport.send(target, &Message::Ping).await.is_ok()
    }

    /// Confirm the companion script is alive, injecting it when the ping
    /// goes unanswered. Substantive work is never sent to an unverified
    /// target.
    pub async fn ensure_ready(&mut self, target: TargetId) -> Result<()> {
        if self.verify_alive(target).await {
            self.status = ScriptStatus::Verified;
            return Ok(());
        }

        self.status = ScriptStatus::Injecting;
        tracing::debug!(tab = target, "content script not responding; injecting");
        if let Err(e) = self.transport.inject(target).await {
            self.status = ScriptStatus::Unreachable;
            return Err(AgentError::Injection(e.to_string()));
        }

        sleep(INJECTION_SETTLE).await;
        if self.verify_alive(target).await {
            self.status = ScriptStatus::Verified;
            Ok(())
        } else {
            self.status = ScriptStatus::Unreachable;
            Err(AgentError::ScriptUnresponsive)
        }
    }

    /// Deliver with bounded exponential backoff.
    ///
    /// Attempt `i` waits `min(100 * 2^i, 1000)` ms before sending, the
    /// first attempt included, to allow post-injection settling. The
    /// backoff is deterministic and unjittered: the target is a local
    /// process, not a remote network service.
    pub async fn send_with_retry(
        &self,
        target: TargetId,
        message: &Message,
        max_attempts: u32,
    ) -> Result<Value> {
        let mut last_error = String::new();
        for attempt in 0..max_attempts {
            sleep(backoff_delay(attempt)).await;
            match self.transport.send(target, message).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(tab = target, attempt, error = %e, "message delivery failed");
                    last_error = e.to_string();
                }
            }
        }
        Err(AgentError::Delivery {
            attempts: max_attempts,
            last_error,
        })
    }

    /// Best-effort user-facing toast; delivery problems are logged and
    /// swallowed so a missing notification never fails the operation.
    pub async fn notify(&self, target: TargetId, message: &str, kind: NotificationKind) {
        let msg = Message::ShowNotification {
            message: message.to_string(),
            kind,
        };
        if let Err(e) = self.transport.send(target, &msg).await {
            tracing::warn!(tab = target, error = %e, "could not show notification");
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let ms = BASE_DELAY_MS
        .checked_shl(attempt)
        .unwrap_or(MAX_DELAY_MS)
        .min(MAX_DELAY_MS);
    Duration::from_millis(ms)
}
