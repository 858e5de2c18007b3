use crate::bookmark::now_ms;
use crate::store::Store;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Cached transcript for one video. `raw` is written once at scrape time;
/// `formatted` arrives later, if the formatting call succeeds at all. A
/// record with only `raw` is valid indefinitely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transcript {
    pub raw: Option<String>,
    pub formatted: Option<String>,
    pub metadata: Option<TranscriptMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMetadata {
    pub title: String,
    pub video_id: String,
    pub retrieved_at: i64,
    pub source: String,
}

impl TranscriptMetadata {
    pub fn dom_scraped(title: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            video_id: video_id.into(),
            retrieved_at: now_ms(),
            source: "dom-scraping".to_string(),
        }
    }
}

/// Persist the raw transcript, merging into any existing record. Always
/// called before any attempt to write `formatted`.
pub async fn save_raw(
    store: &impl Store,
    video_id: &str,
    raw: String,
    metadata: TranscriptMetadata,
) -> Result<()> {
    let mut transcripts = store.load_transcripts().await?;
    let entry = transcripts.entry(video_id.to_string()).or_default();
    entry.raw = Some(raw);
    entry.metadata = Some(metadata);
    store.save_transcripts(&transcripts).await
}

/// Attach the formatted markdown to an existing record. A missing record is
/// a no-op: formatting output without a raw transcript is never stored.
pub async fn set_formatted(store: &impl Store, video_id: &str, formatted: String) -> Result<()> {
    let mut transcripts = store.load_transcripts().await?;
    if let Some(entry) = transcripts.get_mut(video_id) {
        entry.formatted = Some(formatted);
        store.save_transcripts(&transcripts).await?;
    }
    Ok(())
}

pub async fn get(store: &impl Store, video_id: &str) -> Result<Option<Transcript>> {
    Ok(store.load_transcripts().await?.get(video_id).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn raw_is_written_before_formatted() {
        let store = MemoryStore::new();
        save_raw(
            &store,
            "abc123",
            "hello world".to_string(),
            TranscriptMetadata::dom_scraped("Video", "abc123"),
        )
        .await
        .unwrap();

        let record = get(&store, "abc123").await.unwrap().unwrap();
        assert_eq!(record.raw.as_deref(), Some("hello world"));
        assert!(record.formatted.is_none());

        set_formatted(&store, "abc123", "## 0:00 hello".to_string())
            .await
            .unwrap();
        let record = get(&store, "abc123").await.unwrap().unwrap();
        assert_eq!(record.raw.as_deref(), Some("hello world"));
        assert_eq!(record.formatted.as_deref(), Some("## 0:00 hello"));
    }

    #[tokio::test]
    async fn formatting_without_raw_record_is_dropped() {
        let store = MemoryStore::new();
        set_formatted(&store, "missing", "## formatted".to_string())
            .await
            .unwrap();
        assert!(get(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_raw_preserves_existing_formatted() {
        let store = MemoryStore::new();
        save_raw(
            &store,
            "abc123",
            "v1".to_string(),
            TranscriptMetadata::dom_scraped("Video", "abc123"),
        )
        .await
        .unwrap();
        set_formatted(&store, "abc123", "## v1".to_string())
            .await
            .unwrap();

        save_raw(
            &store,
            "abc123",
            "v2".to_string(),
            TranscriptMetadata::dom_scraped("Video", "abc123"),
        )
        .await
        .unwrap();

        let record = get(&store, "abc123").await.unwrap().unwrap();
        assert_eq!(record.raw.as_deref(), Some("v2"));
        assert_eq!(record.formatted.as_deref(), Some("## v1"));
    }
}
