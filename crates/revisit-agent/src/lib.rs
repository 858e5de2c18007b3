pub mod bridge;
pub mod enrich;
pub mod error;
pub mod messages;
pub mod orchestrator;
pub mod scrape;

pub use bridge::{ContentScriptBridge, PageTransport, ScriptStatus, TargetId};
pub use error::{AgentError, Result};
pub use messages::{BookmarkUpdate, Message, NotificationKind, RevisitAction};
pub use orchestrator::{AddBookmarkOutcome, ConnectionReport, Orchestrator};
pub use scrape::Dom;
