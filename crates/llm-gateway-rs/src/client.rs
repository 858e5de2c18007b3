use crate::error::{GatewayError, Result};
use crate::provider::{format_request, Provider};
use crate::types::{CallOptions, ChatMessage, ChatOutcome, Usage};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "https://llmproxy.api.sparkbright.me";

/// Client for the unified LLM gateway.
///
/// A single-attempt primitive: it classifies failures but never retries.
/// Retry and fallback policy belong to the caller.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    client: Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One chat completion through the gateway.
    ///
    /// Fails fast with [`GatewayError::MissingApiKey`] before any network
    /// I/O when the key is empty. `conversation_id` opts into server-side
    /// caching.
    pub async fn chat(
        &self,
        provider: &Provider,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
        api_key: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatOutcome> {
        if api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }

        let mut body = format_request(provider, model, messages, options);
        if let Some(id) = conversation_id {
            body["conversationId"] = Value::String(id.to_string());
        }

        tracing::debug!(
            provider = %provider,
            model,
            message_count = messages.len(),
            "dispatching chat completion"
        );

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &text, provider, model));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        // The gateway wraps provider-specific shapes into the standard
        // format; a missing content field means the wrapping failed.
        let content = data
            .pointer("/response/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or(GatewayError::MissingContent)?
            .to_string();

        let usage: Usage = data
            .get("usage")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Ok(ChatOutcome {
            content,
            usage,
            metadata: data.get("metadata").cloned(),
            provider: field_str(&data, "provider"),
            model: field_str(&data, "model"),
        })
    }

    /// Liveness probe; no auth required.
    pub async fn health(&self) -> Result<Value> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                message: "health check failed; the gateway may be down".to_string(),
            });
        }
        resp.json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Provider-to-model-list map used to populate configuration UIs.
    pub async fn models(&self, api_key: &str) -> Result<Value> {
        if api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        let resp = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                return Err(GatewayError::Authentication(error_field(
                    &text,
                    "invalid API key",
                )));
            }
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                message: error_field(&text, "failed to fetch models"),
            });
        }
        resp.json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Out-of-band API key provisioning; used during setup, not at runtime.
    pub async fn provision_app(&self, app_name: &str, rate_limit: u32) -> Result<String> {
        let body = serde_json::json!({ "appName": app_name, "rateLimit": rate_limit });
        let resp = self
            .client
            .post(format!("{}/admin/apps", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                message: error_field(&text, "app provisioning failed"),
            });
        }
        let data: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        data.get("apiKey")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Parse("missing apiKey in provisioning response".to_string()))
    }
}

/// Map an HTTP failure onto the error taxonomy. Error bodies are
/// best-effort JSON `{error, details}`; an unparseable body degrades to a
/// generic message, never to a panic.
fn classify_failure(
    status: StatusCode,
    body: &str,
    provider: &Provider,
    model: &str,
) -> GatewayError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error = parsed.get("error").and_then(Value::as_str);
    let details = parsed.get("details");

    match status.as_u16() {
        401 => GatewayError::Authentication(error.unwrap_or("invalid API key").to_string()),
        429 => GatewayError::RateLimited(
            details
                .and_then(Value::as_str)
                .or(error)
                .unwrap_or("too many requests")
                .to_string(),
        ),
        400 => GatewayError::InvalidRequest(error.unwrap_or("bad request").to_string()),
        500 => {
            let mut message = error.unwrap_or("internal server error").to_string();
            if let Some(details) = details {
                message.push_str(&format!(" (details: {details})"));
            }
            GatewayError::Gateway {
                provider: provider.as_str().to_string(),
                model: model.to_string(),
                message,
            }
        }
        code => GatewayError::UnexpectedStatus {
            status: code,
            message: error.unwrap_or("unknown error").to_string(),
        },
    }
}

fn error_field(body: &str, fallback: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| fallback.to_string())
}

fn field_str(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}
