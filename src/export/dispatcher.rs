use super::{ExportJob, MessageQueue, EXPORT_PLAYLISTS_QUEUE};
use crate::authorization::{Identity, PlaylistAuthorizer};
use crate::error::{CatalogError, CatalogResult};
use crate::server::metrics;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Acknowledgment that an export job was handed to the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAccepted {
    pub queue: String,
    pub playlist_id: String,
}

#[derive(Clone)]
pub struct ExportDispatcher {
    authorizer: PlaylistAuthorizer,
    queue: Arc<dyn MessageQueue>,
}

impl ExportDispatcher {
    pub fn new(authorizer: PlaylistAuthorizer, queue: Arc<dyn MessageQueue>) -> Self {
        Self { authorizer, queue }
    }

    /// Checks that `requester` can access the playlist and enqueues an export
    /// job for it. Returns as soon as the queue accepted the message.
    pub async fn dispatch(
        &self,
        playlist_id: &str,
        requester: &Identity,
        target_email: &str,
    ) -> CatalogResult<JobAccepted> {
        let result = self.try_dispatch(playlist_id, requester, target_email).await;
        let outcome = match &result {
            Ok(_) => "accepted",
            Err(err) => err.kind(),
        };
        metrics::record_export_dispatch(outcome);
        result
    }

    async fn try_dispatch(
        &self,
        playlist_id: &str,
        requester: &Identity,
        target_email: &str,
    ) -> CatalogResult<JobAccepted> {
        validate_email(target_email)?;
        self.authorizer.verify_access(playlist_id, requester)?;

        let job = ExportJob {
            playlist_id: playlist_id.to_string(),
            target_email: target_email.to_string(),
        };
        let message = serde_json::to_string(&job)
            .map_err(|err| CatalogError::Store(anyhow::Error::new(err)))?;

        if let Err(err) = self.queue.publish(EXPORT_PLAYLISTS_QUEUE, &message).await {
            error!(
                "Failed to enqueue export of playlist {}: {}",
                playlist_id, err
            );
            return Err(CatalogError::Unavailable(format!(
                "Export queue is unavailable: {}",
                err
            )));
        }

        info!(
            "Export of playlist {} requested by {} queued",
            playlist_id, requester
        );
        Ok(JobAccepted {
            queue: EXPORT_PLAYLISTS_QUEUE.to_string(),
            playlist_id: playlist_id.to_string(),
        })
    }
}

fn validate_email(email: &str) -> CatalogResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CatalogError::Invariant(format!(
            "'{}' is not a valid target email",
            email
        )))
    }
}
