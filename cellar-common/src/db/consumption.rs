//! Consumption history

use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Record that `user_scope` opened `bottle_id` at `opened_at`
pub async fn record_opened(
    pool: &SqlitePool,
    user_scope: &str,
    bottle_id: &str,
    opened_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO consumption_log (user_scope, bottle_id, opened_at_ms) VALUES (?, ?, ?)",
    )
    .bind(user_scope)
    .bind(bottle_id)
    .bind(opened_at.timestamp_millis())
    .execute(pool)
    .await?;

    Ok(())
}

/// Distinct bottle ids opened by `user_scope` at or after `since`
pub async fn opened_since(
    pool: &SqlitePool,
    user_scope: &str,
    since: DateTime<Utc>,
) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT bottle_id
        FROM consumption_log
        WHERE user_scope = ? AND opened_at_ms >= ?
        ORDER BY bottle_id ASC
        "#,
    )
    .bind(user_scope)
    .bind(since.timestamp_millis())
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("bottle_id")).collect())
}
