use crate::bridge::{ContentScriptBridge, PageTransport, TargetId, DEFAULT_MAX_ATTEMPTS};
use crate::enrich::{self, Enrichment};
use crate::error::{AgentError, Result};
use crate::messages::{BookmarkUpdate, Message, NotificationKind, RevisitAction};
use crate::scrape::{page, youtube, Dom, VideoCapture};
use llm_gateway_rs::GatewayClient;
use revisit_core::{category, transcript, Bookmark, Settings, Store, Transcript, TranscriptMetadata};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Result of one add-bookmark operation.
#[derive(Debug)]
pub struct AddBookmarkOutcome {
    pub bookmark: Bookmark,
    /// Background persistence of the formatted transcript. Production
    /// callers drop the handle; tests await it to observe the write.
    pub formatting_task: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Value>,
}

/// Coordinates one user-visible operation at a time over the store, the
/// page-resident script, and the LLM gateway. Lower layers raise typed
/// failures; this is the only place that converts them into fallbacks or
/// user-visible errors.
pub struct Orchestrator<S, T>
where
    S: Store + 'static,
    T: PageTransport + 'static,
{
    store: Arc<S>,
    transport: Arc<T>,
    gateway: GatewayClient,
}

impl<S, T> Orchestrator<S, T>
where
    S: Store + 'static,
    T: PageTransport + 'static,
{
    pub fn new(store: Arc<S>, transport: Arc<T>, gateway: GatewayClient) -> Self {
        Self {
            store,
            transport,
            gateway,
        }
    }

    /// The add-bookmark flow: persist a preliminary record immediately,
    /// scrape, enrich through the gateway, and present the result for
    /// review. Enrichment failures degrade or surface; the preliminary
    /// record is never silently dropped.
    pub async fn add_bookmark(
        &self,
        target: TargetId,
        dom: &impl Dom,
        url: &str,
        title: &str,
    ) -> Result<AddBookmarkOutcome> {
        // Companion script first, so status toasts can be shown at all.
        let mut bridge = ContentScriptBridge::new(Arc::clone(&self.transport));
        bridge.ensure_ready(target).await?;
        bridge
            .notify(target, "Gathering Details...", NotificationKind::Info)
            .await;

        let mut data = self.store.load().await?;
        let bookmark = Bookmark::preliminary(url, title, data.settings.default_interval_days);
        tracing::debug!(
            bookmark_id = %bookmark.id,
            url,
            is_youtube = bookmark.is_youtube,
            "created preliminary bookmark"
        );
        data.bookmarks.push(bookmark.clone());
        self.store.save(&data).await?;

        let categories = category::sorted_names(&data.categories);
        let settings = data.settings;

        let enriched = if bookmark.is_youtube {
            self.enrich_youtube(target, dom, &bookmark, &settings, &categories)
                .await
        } else {
            self.enrich_page(dom, &settings, &categories)
                .await
                .map(|enrichment| (enrichment, None))
        };

        match enriched {
            Ok((enrichment, formatting_task)) => {
                let bookmark = self.persist_enrichment(&bookmark.id, enrichment).await?;
                bridge
                    .send_with_retry(
                        target,
                        &Message::InjectOverlayWithAiResults {
                            bookmark_id: bookmark.id.clone(),
                            bookmark_data: bookmark.clone(),
                        },
                        DEFAULT_MAX_ATTEMPTS,
                    )
                    .await?;
                Ok(AddBookmarkOutcome {
                    bookmark,
                    formatting_task,
                })
            }
            Err(e) => {
                // The preliminary record survives; the user decides its
                // fate from the overlay.
                bridge
                    .notify(
                        target,
                        &format!("Could not summarize this page: {e}"),
                        NotificationKind::Error,
                    )
                    .await;
                Err(e)
            }
        }
    }

    async fn enrich_page(
        &self,
        dom: &impl Dom,
        settings: &Settings,
        categories: &[String],
    ) -> Result<Enrichment> {
        let capture = page::capture(dom).await;
        tracing::debug!(content_len = capture.content.len(), "page scraped");
        enrich::summarize_page(
            &self.gateway,
            &settings.gateway.transactions.page_summary,
            &settings.gateway.api_key,
            &capture.content,
            categories,
        )
        .await
        .map_err(AgentError::from)
    }

    async fn enrich_youtube(
        &self,
        target: TargetId,
        dom: &impl Dom,
        bookmark: &Bookmark,
        settings: &Settings,
        categories: &[String],
    ) -> Result<(Enrichment, Option<JoinHandle<()>>)> {
        let video = youtube::capture(dom, &bookmark.url).await?;
        let raw = match youtube::scrape_transcript(dom).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(error = %e, "transcript unavailable; continuing without it");
                None
            }
        };

        if let Some(raw) = raw {
            match self
                .enrich_with_transcript(target, &video, raw, settings, categories)
                .await
            {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "transcript enrichment failed; falling back to metadata summary"
                    );
                }
            }
        }

        // Degraded path: the generic single-call summary over whatever
        // metadata the page gave us.
        let content = format!("{}\n\n{}", video.title, video.description);
        let enrichment = enrich::summarize_page(
            &self.gateway,
            &settings.gateway.transactions.page_summary,
            &settings.gateway.api_key,
            &content,
            categories,
        )
        .await?;
        Ok((enrichment, None))
    }

    async fn enrich_with_transcript(
        &self,
        target: TargetId,
        video: &VideoCapture,
        raw: String,
        settings: &Settings,
        categories: &[String],
    ) -> Result<(Enrichment, Option<JoinHandle<()>>)> {
        // The raw transcript is persisted before either call starts, so an
        // LLM failure can never lose it.
        transcript::save_raw(
            self.store.as_ref(),
            &video.video_id,
            raw.clone(),
            TranscriptMetadata::dom_scraped(&video.title, &video.video_id),
        )
        .await?;

        let transactions = &settings.gateway.transactions;
        let api_key = &settings.gateway.api_key;
        tracing::debug!(video_id = %video.video_id, "launching summary and formatting calls");

        // Two independent calls, joined; neither cancels the other.
        let (summary, formatted) = tokio::join!(
            enrich::summarize_video(
                &self.gateway,
                &transactions.youtube_summary,
                api_key,
                &video.title,
                &video.description,
                &raw,
                categories,
            ),
            enrich::format_transcript(
                &self.gateway,
                &transactions.transcript_formatting,
                api_key,
                &raw,
            ),
        );

        // The summary decides the operation; formatting only degrades.
        let enrichment = summary?;
        let formatting_task = match formatted {
            Ok(markdown) => {
                Some(self.spawn_formatted_persist(target, video.video_id.clone(), markdown))
            }
            Err(e) => {
                tracing::warn!(error = %e, "transcript formatting failed; keeping raw only");
                None
            }
        };
        Ok((enrichment, formatting_task))
    }

    /// Fire-and-forget persistence of the formatted transcript. A failed
    /// write is logged; it never alters the bookmark's state.
    fn spawn_formatted_persist(
        &self,
        target: TargetId,
        video_id: String,
        markdown: String,
    ) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            match transcript::set_formatted(store.as_ref(), &video_id, markdown).await {
                Ok(()) => {
                    let bridge = ContentScriptBridge::new(transport);
                    bridge
                        .notify(target, "Transcript Saved", NotificationKind::Success)
                        .await;
                }
                Err(e) => {
                    tracing::error!(video_id = %video_id, error = %e, "failed to save formatted transcript");
                }
            }
        })
    }

    async fn persist_enrichment(&self, bookmark_id: &str, enrichment: Enrichment) -> Result<Bookmark> {
        let mut data = self.store.load().await?;
        let bookmark = data
            .bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark_id)
            .ok_or_else(|| AgentError::BookmarkNotFound(bookmark_id.to_string()))?;
        bookmark.apply_enrichment(enrichment.category, enrichment.summary, enrichment.tags);
        let snapshot = bookmark.clone();
        self.store.save(&data).await?;
        Ok(snapshot)
    }

    /// Apply user edits from the review overlay and finalize the record. A
    /// category name not yet in the set is appended with the next priority.
    pub async fn finalize(&self, bookmark_id: &str, update: BookmarkUpdate) -> Result<Bookmark> {
        let mut data = self.store.load().await?;
        if let Some(candidate) = update.category.as_deref() {
            data.categories = category::reconcile(std::mem::take(&mut data.categories), candidate);
        }
        let bookmark = data
            .bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark_id)
            .ok_or_else(|| AgentError::BookmarkNotFound(bookmark_id.to_string()))?;
        update.apply(bookmark);
        bookmark.is_preliminary = false;
        let snapshot = bookmark.clone();
        self.store.save(&data).await?;
        tracing::debug!(bookmark_id, "bookmark finalized");
        Ok(snapshot)
    }

    /// Delete the record entirely, preliminary or not. Deleting an id that
    /// is already gone is not an error.
    pub async fn cancel(&self, bookmark_id: &str) -> Result<()> {
        let mut data = self.store.load().await?;
        data.bookmarks.retain(|b| b.id != bookmark_id);
        self.store.save(&data).await?;
        tracing::debug!(bookmark_id, "bookmark canceled");
        Ok(())
    }

    /// The revisit side state machine, layered on a finalized bookmark.
    pub async fn revisit(&self, bookmark_id: &str, action: RevisitAction) -> Result<Bookmark> {
        let mut data = self.store.load().await?;
        let interval_days = data.settings.default_interval_days;
        let bookmark = data
            .bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark_id)
            .ok_or_else(|| AgentError::BookmarkNotFound(bookmark_id.to_string()))?;
        match action {
            RevisitAction::Complete => bookmark.mark_complete(),
            RevisitAction::ReVisited => bookmark.mark_revisited(interval_days),
        }
        let snapshot = bookmark.clone();
        self.store.save(&data).await?;
        Ok(snapshot)
    }

    /// Transcript cache lookup for the viewer overlay.
    pub async fn transcript(&self, video_id: &str) -> Result<Option<Transcript>> {
        Ok(transcript::get(self.store.as_ref(), video_id).await?)
    }

    /// Two-step connectivity check: unauthenticated health probe, then an
    /// authenticated model listing. Never errors; the report carries the
    /// outcome either way.
    pub async fn test_gateway_connection(&self, api_key: &str) -> ConnectionReport {
        if let Err(e) = self.gateway.health().await {
            return ConnectionReport {
                success: false,
                message: e.to_string(),
                models: None,
            };
        }
        match self.gateway.models(api_key).await {
            Ok(models) => ConnectionReport {
                success: true,
                message: "Connection successful!".to_string(),
                models: Some(models),
            },
            Err(e) => ConnectionReport {
                success: false,
                message: e.to_string(),
                models: None,
            },
        }
    }

    /// Dispatch one overlay-originated message onto the operations above.
    pub async fn handle_message(&self, message: Message) -> Result<Value> {
        match message {
            Message::UpdateBookmarkStatus {
                bookmark_id,
                action_type,
            } => {
                self.revisit(&bookmark_id, action_type).await?;
                Ok(json!({ "success": true }))
            }
            Message::UpdateBookmark {
                bookmark_id,
                updated_data,
            } => {
                self.finalize(&bookmark_id, updated_data).await?;
                Ok(json!({ "success": true }))
            }
            Message::CancelBookmark { bookmark_id } => {
                self.cancel(&bookmark_id).await?;
                Ok(json!({ "success": true }))
            }
            Message::GetTranscript { video_id } => {
                let record = self.transcript(&video_id).await?;
                Ok(json!({ "success": true, "transcript": record }))
            }
            Message::TestGatewayConnection { api_key } => {
                let report = self.test_gateway_connection(&api_key).await;
                Ok(serde_json::to_value(report).unwrap_or(Value::Null))
            }
            other => {
                tracing::warn!(?other, "unhandled message action");
                Ok(json!({ "success": false, "error": "unsupported action" }))
            }
        }
    }
}
