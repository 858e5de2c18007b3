use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("LLM gateway API key is required; configure it in settings")]
    MissingApiKey,
    #[error("gateway configuration missing: {0}")]
    Config(String),
    #[error("authentication failed: {0}; check your gateway API key in settings")]
    Authentication(String),
    #[error("rate limit exceeded: {0}; wait a moment and try again")]
    RateLimited(String),
    #[error("invalid request: {0}; check your provider/model configuration")]
    InvalidRequest(String),
    #[error("gateway error: {message} (provider: {provider}, model: {model})")]
    Gateway {
        provider: String,
        model: String,
        message: String,
    },
    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("network error: unable to reach the LLM gateway: {0}")]
    Network(String),
    #[error("invalid response format from gateway: missing message content")]
    MissingContent,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("failed to extract valid JSON from LLM response")]
    JsonExtraction,
}

pub type Result<T> = std::result::Result<T, GatewayError>;
