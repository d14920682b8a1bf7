//! Database operations for the `chat_messages` table: the per-order
//! conversation between a customer and a facility operator.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `chat_messages` table. `sender` is `"client"` or
/// `"shop"`, enforced by a check constraint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessageRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Appends a message to an order's conversation.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails — including the foreign
/// key violation for an unknown order.
pub async fn append_chat_message(
    pool: &PgPool,
    order_id: Uuid,
    sender: &str,
    body: &str,
) -> Result<ChatMessageRow, DbError> {
    let row = sqlx::query_as::<_, ChatMessageRow>(
        "INSERT INTO chat_messages (order_id, sender, body) \
         VALUES ($1, $2, $3) \
         RETURNING id, order_id, sender, body, created_at",
    )
    .bind(order_id)
    .bind(sender)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns an order's conversation, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_chat_messages(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Vec<ChatMessageRow>, DbError> {
    let rows = sqlx::query_as::<_, ChatMessageRow>(
        "SELECT id, order_id, sender, body, created_at \
         FROM chat_messages \
         WHERE order_id = $1 \
         ORDER BY created_at",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
