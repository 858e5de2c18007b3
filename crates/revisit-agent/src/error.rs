use llm_gateway_rs::GatewayError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to send message after {attempts} attempts: {last_error}; try refreshing the page")]
    Delivery { attempts: u32, last_error: String },
    #[error("content script injection failed: {0}")]
    Injection(String),
    #[error("content script is not responding to ping; refresh the page and try again")]
    ScriptUnresponsive,
    #[error("{0}")]
    Scrape(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("bookmark not found: {0}")]
    BookmarkNotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
