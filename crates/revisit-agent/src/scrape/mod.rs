pub mod page;
pub mod youtube;

use crate::error::{AgentError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, Instant};

pub use page::{PageCapture, MAX_CONTENT_CHARS};
pub use youtube::VideoCapture;

/// Async view of the live page DOM, as exposed by the page-resident
/// script. Every call is a suspension point across the process boundary.
#[async_trait]
pub trait Dom: Send + Sync {
    async fn url(&self) -> String;
    async fn title(&self) -> String;
    async fn body_text(&self) -> String;
    /// `content` attribute of the named `<meta>` tag.
    async fn meta_content(&self, name: &str) -> Option<String>;
    async fn exists(&self, selector: &str) -> bool;
    async fn click(&self, selector: &str) -> anyhow::Result<()>;
    /// Text of every matching node, in document order.
    async fn text_all(&self, selector: &str) -> Vec<String>;
}

/// Poll until `selector` appears or the timeout elapses. Reports a
/// descriptive error rather than hanging on async-rendered UI that never
/// shows up.
pub async fn wait_for(
    dom: &impl Dom,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if dom.exists(selector).await {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(AgentError::Scrape(format!(
                "timed out after {}ms waiting for {selector}",
                timeout.as_millis()
            )));
        }
        sleep(interval).await;
    }
}
