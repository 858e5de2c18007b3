use revisit_core::bookmark::MAX_TAGS;
use revisit_core::Bookmark;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Messages exchanged with the page-resident script, tagged by `action`.
/// The JSON shapes are the extension's wire protocol and must stay stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Message {
    Ping,
    ScrapePage,
    ScrapeAndShowOverlay {
        bookmark_id: String,
        bookmark_data: Bookmark,
    },
    #[serde(rename = "injectOverlayWithAIResults")]
    InjectOverlayWithAiResults {
        bookmark_id: String,
        bookmark_data: Bookmark,
    },
    ShowNotification {
        message: String,
        #[serde(rename = "type")]
        kind: NotificationKind,
    },
    UpdateBookmarkStatus {
        bookmark_id: String,
        action_type: RevisitAction,
    },
    UpdateBookmark {
        bookmark_id: String,
        updated_data: BookmarkUpdate,
    },
    CancelBookmark {
        bookmark_id: String,
    },
    GetTranscript {
        video_id: String,
    },
    TestGatewayConnection {
        api_key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

/// The two transitions a revisit prompt can trigger on a finalized
/// bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevisitAction {
    Complete,
    ReVisited,
}

/// Partial user edit applied to a bookmark from the review overlay. Absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmarkUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub user_notes: Option<String>,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub revisit_by: Option<OffsetDateTime>,
}

impl BookmarkUpdate {
    pub fn apply(self, bookmark: &mut Bookmark) {
        if let Some(title) = self.title {
            bookmark.title = title;
        }
        if let Some(category) = self.category {
            bookmark.category = category;
        }
        if let Some(summary) = self.summary {
            bookmark.summary = summary;
        }
        if let Some(mut tags) = self.tags {
            tags.truncate(MAX_TAGS);
            bookmark.tags = tags;
        }
        if let Some(user_notes) = self.user_notes {
            bookmark.user_notes = user_notes;
        }
        if let Some(revisit_by) = self.revisit_by {
            bookmark.revisit_by = revisit_by;
        }
    }
}
