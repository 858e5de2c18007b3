use crate::bookmark::Bookmark;
use crate::category::{self, Category};
use crate::settings::Settings;
use crate::transcript::Transcript;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub type TranscriptMap = HashMap<String, Transcript>;

/// The primary persisted record: everything except the transcript cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub bookmarks: Vec<Bookmark>,
    #[serde(deserialize_with = "category::deserialize_list")]
    pub categories: Vec<Category>,
    pub settings: Settings,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            bookmarks: Vec::new(),
            categories: category::default_set(),
            settings: Settings::default(),
        }
    }
}

/// Snapshot store over an opaque key-value mechanism: two keys, read and
/// written whole. Callers own a snapshot for the duration of one operation
/// and write it back; writes are assumed durable and are not retried.
/// Concurrent operations race with last-writer-wins semantics.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> Result<AppData>;
    async fn save(&self, data: &AppData) -> Result<()>;
    async fn load_transcripts(&self) -> Result<TranscriptMap>;
    async fn save_transcripts(&self, transcripts: &TranscriptMap) -> Result<()>;
}

/// In-memory store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<AppData>,
    transcripts: Mutex<TranscriptMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
            transcripts: Mutex::new(TranscriptMap::new()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> Result<AppData> {
        Ok(self.data.lock().expect("store poisoned").clone())
    }

    async fn save(&self, data: &AppData) -> Result<()> {
        *self.data.lock().expect("store poisoned") = data.clone();
        Ok(())
    }

    async fn load_transcripts(&self) -> Result<TranscriptMap> {
        Ok(self.transcripts.lock().expect("store poisoned").clone())
    }

    async fn save_transcripts(&self, transcripts: &TranscriptMap) -> Result<()> {
        *self.transcripts.lock().expect("store poisoned") = transcripts.clone();
        Ok(())
    }
}

/// File-backed store: two pretty-printed JSON documents under one
/// directory. Missing files read as empty defaults.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn data_path(&self) -> PathBuf {
        self.dir.join("data.json")
    }

    fn transcripts_path(&self) -> PathBuf {
        self.dir.join("transcripts.json")
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self) -> Result<AppData> {
        read_json_or_default(&self.data_path())
    }

    async fn save(&self, data: &AppData) -> Result<()> {
        write_json(&self.dir, &self.data_path(), data)
    }

    async fn load_transcripts(&self) -> Result<TranscriptMap> {
        read_json_or_default(&self.transcripts_path())
    }

    async fn save_transcripts(&self, transcripts: &TranscriptMap) -> Result<()> {
        write_json(&self.dir, &self.transcripts_path(), transcripts)
    }
}

fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::Bookmark;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        let mut data = store.load().await.unwrap();
        assert_eq!(data.categories.len(), 4);

        data.bookmarks
            .push(Bookmark::preliminary("https://example.com", "Post", 7));
        store.save(&data).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.bookmarks.len(), 1);
    }

    #[tokio::test]
    async fn json_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        // Missing files read as defaults.
        let data = store.load().await.unwrap();
        assert!(data.bookmarks.is_empty());
        assert_eq!(data.categories.len(), 4);

        let mut data = data;
        data.bookmarks
            .push(Bookmark::preliminary("https://example.com", "Post", 7));
        store.save(&data).await.unwrap();

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.bookmarks.len(), 1);
        assert_eq!(reloaded.bookmarks[0].title, "Post");
    }

    #[tokio::test]
    async fn json_file_store_reads_legacy_category_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"bookmarks": [], "categories": ["Articles", "Research"], "settings": {}}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path());
        let data = store.load().await.unwrap();
        assert_eq!(data.categories[1].name, "Research");
        assert_eq!(data.categories[1].priority, 2);
        assert_eq!(data.settings.default_interval_days, 7);
    }
}
