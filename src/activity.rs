//! Append-only audit trail of playlist song changes.

use crate::authorization::Identity;
use crate::catalog_store::{Activity, ActivityAction, ActivityStore, NewActivity};
use crate::error::CatalogResult;
use crate::server::metrics;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// Non-fatal failure to record an activity. The mutation it describes has
/// already been committed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Activity '{action}' for song {song_id} on playlist {playlist_id} was not recorded: {reason}")]
#[serde(rename_all = "camelCase")]
pub struct ActivityWarning {
    pub playlist_id: String,
    pub song_id: String,
    pub action: ActivityAction,
    pub reason: String,
}

#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn ActivityStore>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Appends one activity, timestamped now. Returns the new record id.
    pub fn record(
        &self,
        playlist_id: &str,
        song_id: &str,
        actor: &Identity,
        action: ActivityAction,
    ) -> Result<i64, ActivityWarning> {
        let activity = NewActivity {
            playlist_id: playlist_id.to_string(),
            song_id: song_id.to_string(),
            actor: actor.as_str().to_string(),
            action,
            timestamp: Utc::now(),
        };
        match self.store.append_activity(&activity) {
            Ok(id) => {
                debug!(
                    "Recorded {} of song {} on playlist {} by {}",
                    action, song_id, playlist_id, actor
                );
                Ok(id)
            }
            Err(err) => {
                metrics::record_activity_failure(action.as_str());
                error!(
                    "Failed to record {} activity on playlist {}: {:#}",
                    action, playlist_id, err
                );
                Err(ActivityWarning {
                    playlist_id: playlist_id.to_string(),
                    song_id: song_id.to_string(),
                    action,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Activities oldest first, ties broken by insertion order.
    pub fn list(&self, playlist_id: &str) -> CatalogResult<Vec<Activity>> {
        Ok(self.store.list_activities(playlist_id)?)
    }
}
