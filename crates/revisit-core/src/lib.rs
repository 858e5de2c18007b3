pub mod bookmark;
pub mod category;
pub mod settings;
pub mod store;
pub mod transcript;

pub use bookmark::{is_youtube_url, new_bookmark_id, Bookmark, BookmarkStatus, HistoryEntry};
pub use category::{reconcile, sorted_names, Category};
pub use settings::{GatewaySettings, Settings, TransactionConfig, TransactionOptions, Transactions};
pub use store::{AppData, JsonFileStore, MemoryStore, Store, TranscriptMap};
pub use transcript::{Transcript, TranscriptMetadata};
