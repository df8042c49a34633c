//! Asynchronous playlist export.
//!
//! The server only enqueues export jobs; producing and delivering the export
//! is the job of an external consumer reading the queue.

mod channel_queue;
mod dispatcher;
mod schema;
mod sqlite_queue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use channel_queue::{ChannelMessageQueue, QueuedMessage};
pub use dispatcher::{ExportDispatcher, JobAccepted};
pub use sqlite_queue::{OutboxMessage, SqliteMessageQueue};

/// Queue the export consumer listens on.
pub const EXPORT_PLAYLISTS_QUEUE: &str = "export:playlists";

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue {0} is closed")]
    Closed(String),

    #[error("Queue {0} is full")]
    Full(String),

    #[error("Queue storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("Message serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// At-least-once message publishing. A successful `publish` means the message
/// was accepted by the queue, never that it was consumed.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError>;
}

/// Message placed on [`EXPORT_PLAYLISTS_QUEUE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub playlist_id: String,
    pub target_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_job_wire_format() {
        let job = ExportJob {
            playlist_id: "playlist-1".to_string(),
            target_email: "u@example.com".to_string(),
        };
        let json: serde_json::Value = serde_json::to_value(&job).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"playlistId": "playlist-1", "targetEmail": "u@example.com"})
        );
    }
}
