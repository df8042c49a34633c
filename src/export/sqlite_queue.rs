//! Durable outbox implementation of [`MessageQueue`].
//!
//! Published messages stay pending until a consumer acknowledges them, so a
//! consumer that crashes between fetch and acknowledge sees them again.

use super::schema::{OUTBOX_MESSAGES_TABLE, OUTBOX_VERSIONED_SCHEMAS};
use super::{MessageQueue, QueueError};
use crate::sqlite_persistence::{open_in_memory_db, open_versioned_db};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub id: i64,
    pub queue: String,
    pub payload: String,
    pub created_at: i64,
    pub delivery_attempts: u32,
}

#[derive(Clone)]
pub struct SqliteMessageQueue {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageQueue {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, OUTBOX_VERSIONED_SCHEMAS)?;
        Ok(SqliteMessageQueue {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = open_in_memory_db(OUTBOX_VERSIONED_SCHEMAS)?;
        Ok(SqliteMessageQueue {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn insert(&self, queue: &str, payload: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (queue, payload, created_at) VALUES (?1, ?2, ?3)",
                OUTBOX_MESSAGES_TABLE.name
            ),
            params![queue, payload, Utc::now().timestamp_millis()],
        )
        .with_context(|| format!("Failed to append message to queue {}", queue))?;
        Ok(conn.last_insert_rowid())
    }

    /// Returns up to `limit` unacknowledged messages of `queue`, oldest first,
    /// and bumps their delivery counter.
    pub fn fetch_pending(&self, queue: &str, limit: usize) -> Result<Vec<OutboxMessage>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let messages = {
            let mut stmt = tx.prepare(&format!(
                "SELECT id, queue, payload, created_at, delivery_attempts FROM {}
                 WHERE queue = ?1 AND acknowledged_at IS NULL
                 ORDER BY id LIMIT ?2",
                OUTBOX_MESSAGES_TABLE.name
            ))?;
            let rows = stmt
                .query_map(params![queue, limit as i64], |row| {
                    Ok(OutboxMessage {
                        id: row.get(0)?,
                        queue: row.get(1)?,
                        payload: row.get(2)?,
                        created_at: row.get(3)?,
                        delivery_attempts: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        for message in &messages {
            tx.execute(
                &format!(
                    "UPDATE {} SET delivery_attempts = delivery_attempts + 1 WHERE id = ?1",
                    OUTBOX_MESSAGES_TABLE.name
                ),
                params![message.id],
            )?;
        }
        tx.commit()?;
        Ok(messages
            .into_iter()
            .map(|mut m| {
                m.delivery_attempts += 1;
                m
            })
            .collect())
    }

    /// Marks a message as consumed. Returns false if it was unknown or
    /// already acknowledged.
    pub fn acknowledge(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET acknowledged_at = ?1 WHERE id = ?2 AND acknowledged_at IS NULL",
                OUTBOX_MESSAGES_TABLE.name
            ),
            params![Utc::now().timestamp_millis(), id],
        )?;
        Ok(changed > 0)
    }

    pub fn pending_count(&self, queue: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE queue = ?1 AND acknowledged_at IS NULL",
                OUTBOX_MESSAGES_TABLE.name
            ),
            params![queue],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[async_trait]
impl MessageQueue for SqliteMessageQueue {
    async fn publish(&self, queue: &str, message: &str) -> Result<(), QueueError> {
        let id = self.insert(queue, message)?;
        debug!("Queued message {} on {}", id, queue);
        Ok(())
    }
}
