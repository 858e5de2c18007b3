use super::Dom;
use serde::{Deserialize, Serialize};

/// Bound on how much body text is carried into the summary prompt.
pub const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCapture {
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Generic page scrape: the title plus a bounded prefix of the extracted
/// body text. Deterministic; no waiting on anything.
pub async fn capture(dom: &impl Dom) -> PageCapture {
    let title = dom.title().await;
    PageCapture {
        url: dom.url().await,
        title: if title.is_empty() {
            "Untitled".to_string()
        } else {
            title
        },
        content: truncate_chars(&dom.body_text().await, MAX_CONTENT_CHARS),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
