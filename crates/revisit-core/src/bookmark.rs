use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use time::serde::rfc3339;
use time::{Duration, OffsetDateTime};

/// Hard cap on tags carried by a bookmark; enrichment output beyond this is
/// truncated rather than rejected.
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookmarkStatus {
    Active,
    Complete,
    ReVisited,
}

impl Default for BookmarkStatus {
    fn default() -> Self {
        Self::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub user_notes: String,
    pub added_timestamp: i64,
    #[serde(with = "rfc3339")]
    pub revisit_by: OffsetDateTime,
    pub status: BookmarkStatus,
    pub history: Vec<HistoryEntry>,
    pub is_preliminary: bool,
    #[serde(rename = "isYouTube")]
    pub is_youtube: bool,
}

impl Bookmark {
    /// Placeholder record persisted the instant the user asks for a
    /// bookmark, before any scraping or enrichment has run. It must either
    /// be enriched/finalized or deleted; there is no third outcome.
    pub fn preliminary(url: impl Into<String>, title: impl Into<String>, interval_days: i64) -> Self {
        let url = url.into();
        let title = title.into();
        let is_youtube = is_youtube_url(&url);
        Self {
            id: new_bookmark_id(),
            url,
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title
            },
            category: "Uncategorized".to_string(),
            summary: String::new(),
            tags: Vec::new(),
            user_notes: String::new(),
            added_timestamp: now_ms(),
            revisit_by: OffsetDateTime::now_utc() + Duration::days(interval_days),
            status: BookmarkStatus::Active,
            history: Vec::new(),
            is_preliminary: true,
            is_youtube,
        }
    }

    /// Merge AI enrichment into the record and take it out of the
    /// preliminary state.
    pub fn apply_enrichment(&mut self, category: String, summary: String, mut tags: Vec<String>) {
        tags.truncate(MAX_TAGS);
        self.category = category;
        self.summary = summary;
        self.tags = tags;
        self.is_preliminary = false;
    }

    pub fn mark_complete(&mut self) {
        self.status = BookmarkStatus::Complete;
        self.history.push(HistoryEntry {
            timestamp: now_ms(),
            action: "Marked as Complete".to_string(),
        });
    }

    /// Push the revisit date out by `interval_days` and reactivate.
    pub fn mark_revisited(&mut self, interval_days: i64) {
        self.revisit_by = OffsetDateTime::now_utc() + Duration::days(interval_days);
        self.status = BookmarkStatus::Active;
        self.history.push(HistoryEntry {
            timestamp: now_ms(),
            action: "ReVisited - Updated revisit date".to_string(),
        });
    }
}

/// Opaque unique id: `rv-<ms epoch>-<random alnum>`.
pub fn new_bookmark_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("rv-{}-{}", now_ms(), suffix.to_lowercase())
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com/watch") || url.contains("youtu.be/")
}

pub fn now_ms() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
