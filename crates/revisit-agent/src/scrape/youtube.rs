use super::{wait_for, Dom};
use crate::error::{AgentError, Result};
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

// Selectors for driving the hidden transcript UI. Kept in one place: when
// the YouTube DOM changes, this is the file to fix.
pub const EXPAND_DESCRIPTION: &str = "tp-yt-paper-button#expand";
pub const SHOW_TRANSCRIPT: &str = "ytd-video-description-transcript-section-renderer button";
pub const SEGMENT_TEXT: &str = "ytd-transcript-segment-renderer .segment-text";

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const WAIT_TIMEOUT: Duration = Duration::from_millis(5000);
const RENDER_SETTLE: Duration = Duration::from_millis(500);

const TITLE_SUFFIX: &str = " - YouTube";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCapture {
    pub video_id: String,
    pub title: String,
    pub description: String,
}

/// Canonical video identifier: the `v` query parameter when present, else
/// the last path segment (youtu.be short links).
pub fn video_id(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    if let Some((_, v)) = parsed.query_pairs().find(|(k, _)| k == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Video title (minus the site suffix) and description from page metadata.
pub async fn capture(dom: &impl Dom, raw_url: &str) -> Result<VideoCapture> {
    let video_id = video_id(raw_url).ok_or_else(|| {
        AgentError::Scrape(format!("could not extract a video id from {raw_url}"))
    })?;
    let mut title = dom.title().await;
    if let Some(stripped) = title.strip_suffix(TITLE_SUFFIX) {
        title = stripped.to_string();
    }
    let description = dom.meta_content("description").await.unwrap_or_default();
    Ok(VideoCapture {
        video_id,
        title,
        description,
    })
}

/// Best-effort transcript extraction by driving the hidden panel UI.
///
/// When the panel is closed, the description is expanded and the "show
/// transcript" control clicked, each gated by a bounded polling wait for
/// the async-rendered node. A video without a transcript (or a changed UI)
/// reports a descriptive error; callers treat that as a downgrade, not a
/// failure of the bookmark flow.
pub async fn scrape_transcript(dom: &impl Dom) -> Result<String> {
    if !dom.exists(SEGMENT_TEXT).await {
        open_transcript_panel(dom).await?;
    }

    // Segments keep rendering for a moment after the panel opens.
    sleep(RENDER_SETTLE).await;

    let segments = dom.text_all(SEGMENT_TEXT).await;
    let joined = segments
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return Err(AgentError::Scrape(
            "transcript panel opened but contained no segments".to_string(),
        ));
    }
    Ok(joined)
}

async fn open_transcript_panel(dom: &impl Dom) -> Result<()> {
    wait_for(dom, EXPAND_DESCRIPTION, WAIT_TIMEOUT, POLL_INTERVAL).await?;
    dom.click(EXPAND_DESCRIPTION)
        .await
        .map_err(|e| AgentError::Scrape(format!("could not expand description: {e}")))?;

    wait_for(dom, SHOW_TRANSCRIPT, WAIT_TIMEOUT, POLL_INTERVAL).await?;
    dom.click(SHOW_TRANSCRIPT)
        .await
        .map_err(|e| AgentError::Scrape(format!("could not open transcript panel: {e}")))?;

    wait_for(dom, SEGMENT_TEXT, WAIT_TIMEOUT, POLL_INTERVAL).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_id_prefers_query_parameter() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://www.youtube.com/watch?t=42&v=abc123").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn video_id_falls_back_to_path_segment() {
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            video_id("https://youtu.be/dQw4w9WgXcQ/").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn video_id_rejects_unparseable_urls() {
        assert_eq!(video_id("not a url"), None);
    }

    /// DOM where nothing ever renders.
    struct BareDom;

    #[async_trait::async_trait]
    impl Dom for BareDom {
        async fn url(&self) -> String {
            String::new()
        }

        async fn title(&self) -> String {
            String::new()
        }

        async fn body_text(&self) -> String {
            String::new()
        }

        async fn meta_content(&self, _name: &str) -> Option<String> {
            None
        }

        async fn exists(&self, _selector: &str) -> bool {
            false
        }

        async fn click(&self, _selector: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn text_all(&self, _selector: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transcript_scrape_times_out_with_descriptive_error() {
        let err = scrape_transcript(&BareDom).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("timed out after 5000ms"), "{message}");
        assert!(message.contains(EXPAND_DESCRIPTION), "{message}");
    }
}
