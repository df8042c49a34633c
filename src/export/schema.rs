use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

pub const OUTBOX_MESSAGES_TABLE: Table = Table {
    name: "outbox_messages",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("queue", &SqlType::Text, non_null = true),
        sqlite_column!("payload", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "delivery_attempts",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("acknowledged_at", &SqlType::Integer),
    ],
    indices: &[("idx_outbox_messages_queue", "queue, acknowledged_at")],
    unique_constraints: &[],
};

pub const OUTBOX_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[OUTBOX_MESSAGES_TABLE],
    migration: None,
}];
