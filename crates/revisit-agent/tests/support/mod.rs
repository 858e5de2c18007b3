//! Shared test doubles: a scriptable page transport, a fake DOM with a
//! closable transcript panel, and a store that records write ordering.
#![allow(dead_code)]

use anyhow::anyhow;
use async_trait::async_trait;
use revisit_agent::scrape::youtube::{EXPAND_DESCRIPTION, SEGMENT_TEXT, SHOW_TRANSCRIPT};
use revisit_agent::{Dom, Message, PageTransport, TargetId};
use revisit_core::{AppData, MemoryStore, Settings, Store, TranscriptMap, TransactionConfig};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Settings with one distinct model per transaction, so mocked gateway
/// responses can route on the requested model.
pub fn test_settings(api_key: &str) -> Settings {
    let mut settings = Settings::default();
    settings.gateway.api_key = api_key.to_string();
    settings.gateway.transactions.youtube_summary =
        TransactionConfig::new("groq", "yt-sum", 0.7, 10_000);
    settings.gateway.transactions.transcript_formatting =
        TransactionConfig::new("groq", "yt-fmt", 0.3, 64_000);
    settings.gateway.transactions.page_summary =
        TransactionConfig::new("groq", "page-sum", 0.7, 2_500);
    settings
}

pub fn app_data(api_key: &str) -> AppData {
    AppData {
        settings: test_settings(api_key),
        ..Default::default()
    }
}

/// A 2xx gateway body wrapping `content` in the standard format.
pub fn gateway_success(content: &str) -> Value {
    json!({
        "response": {
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        },
        "usage": { "prompt_tokens": 10, "completion_tokens": 20 },
        "provider": "groq"
    })
}

/// Fenced enrichment JSON the way a chat model tends to return it.
pub fn enrichment_content(summary: &str, category: &str) -> String {
    format!(
        "```json\n{{\"summary\": \"{summary}\", \"category\": \"{category}\", \"tags\": [\"one\", \"two\"]}}\n```"
    )
}

/// In-process stand-in for the browser messaging boundary.
pub struct FakeTransport {
    pub alive: Mutex<bool>,
    pub injected: Mutex<bool>,
    pub fail_overlay: Mutex<bool>,
    sent: Mutex<Vec<Value>>,
}

impl FakeTransport {
    pub fn alive() -> Self {
        Self {
            alive: Mutex::new(true),
            injected: Mutex::new(false),
            fail_overlay: Mutex::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn dead() -> Self {
        let transport = Self::alive();
        *transport.alive.lock().unwrap() = false;
        transport
    }

    /// Actions of every delivered non-ping message, in order.
    pub fn actions(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m["action"].as_str().map(str::to_string))
            .collect()
    }

    pub fn delivered(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageTransport for FakeTransport {
    async fn send(&self, _target: TargetId, message: &Message) -> anyhow::Result<Value> {
        if !*self.alive.lock().unwrap() {
            return Err(anyhow!("receiving end does not exist"));
        }
        if matches!(message, Message::Ping) {
            return Ok(json!({ "success": true }));
        }
        if *self.fail_overlay.lock().unwrap()
            && matches!(message, Message::InjectOverlayWithAiResults { .. })
        {
            return Err(anyhow!("message port closed before a response was received"));
        }
        self.sent
            .lock()
            .unwrap()
            .push(serde_json::to_value(message)?);
        Ok(json!({ "success": true }))
    }

    async fn inject(&self, _target: TargetId) -> anyhow::Result<()> {
        *self.injected.lock().unwrap() = true;
        *self.alive.lock().unwrap() = true;
        Ok(())
    }
}

#[derive(Default)]
struct PanelState {
    expanded: bool,
    panel_open: bool,
}

/// Fake page DOM. The transcript panel follows the real UI choreography:
/// segments exist only after the description is expanded and the "show
/// transcript" control is clicked.
pub struct FakeDom {
    pub url: String,
    pub title: String,
    pub body: String,
    pub description: Option<String>,
    pub segments: Vec<String>,
    has_transcript: bool,
    state: Mutex<PanelState>,
}

impl FakeDom {
    pub fn page(url: &str, title: &str, body: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            description: None,
            segments: Vec::new(),
            has_transcript: false,
            state: Mutex::new(PanelState::default()),
        }
    }

    pub fn youtube(url: &str, title: &str, description: &str, segments: &[&str]) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            body: String::new(),
            description: Some(description.to_string()),
            segments: segments.iter().map(|s| s.to_string()).collect(),
            has_transcript: !segments.is_empty(),
            state: Mutex::new(PanelState::default()),
        }
    }
}

#[async_trait]
impl Dom for FakeDom {
    async fn url(&self) -> String {
        self.url.clone()
    }

    async fn title(&self) -> String {
        self.title.clone()
    }

    async fn body_text(&self) -> String {
        self.body.clone()
    }

    async fn meta_content(&self, name: &str) -> Option<String> {
        if name == "description" {
            self.description.clone()
        } else {
            None
        }
    }

    async fn exists(&self, selector: &str) -> bool {
        let state = self.state.lock().unwrap();
        match selector {
            EXPAND_DESCRIPTION => true,
            SHOW_TRANSCRIPT => self.has_transcript && state.expanded,
            SEGMENT_TEXT => self.has_transcript && state.panel_open,
            _ => false,
        }
    }

    async fn click(&self, selector: &str) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        match selector {
            EXPAND_DESCRIPTION => state.expanded = true,
            SHOW_TRANSCRIPT if self.has_transcript && state.expanded => state.panel_open = true,
            _ => return Err(anyhow!("no such element: {selector}")),
        }
        Ok(())
    }

    async fn text_all(&self, selector: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        if selector == SEGMENT_TEXT && self.has_transcript && state.panel_open {
            self.segments.clone()
        } else {
            Vec::new()
        }
    }
}

/// Store wrapper that logs every write into a shared event trace, so tests
/// can assert ordering against gateway traffic.
pub struct RecordingStore {
    inner: MemoryStore,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingStore {
    pub fn new(data: AppData, events: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            inner: MemoryStore::with_data(data),
            events,
        }
    }
}

#[async_trait]
impl Store for RecordingStore {
    async fn load(&self) -> anyhow::Result<AppData> {
        self.inner.load().await
    }

    async fn save(&self, data: &AppData) -> anyhow::Result<()> {
        self.events.lock().unwrap().push("save:data".to_string());
        self.inner.save(data).await
    }

    async fn load_transcripts(&self) -> anyhow::Result<TranscriptMap> {
        self.inner.load_transcripts().await
    }

    async fn save_transcripts(&self, transcripts: &TranscriptMap) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push("save:transcripts".to_string());
        self.inner.save_transcripts(transcripts).await
    }
}
