//! Rotation state persistence
//!
//! Each scope (user or session) keeps the bottles it was recently shown.
//! `mark_shown` prunes and writes inside one transaction so concurrent
//! recommendations for the same scope never drop each other's entries.

use super::from_millis;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Rotation entries for `scope` shown at or after `since`, oldest first
pub async fn load_rotation(
    pool: &SqlitePool,
    scope: &str,
    since: DateTime<Utc>,
) -> Result<Vec<(String, DateTime<Utc>)>> {
    let rows = sqlx::query(
        r#"
        SELECT bottle_id, shown_at_ms
        FROM rotation_state
        WHERE scope = ? AND shown_at_ms >= ?
        ORDER BY shown_at_ms ASC, bottle_id ASC
        "#,
    )
    .bind(scope)
    .bind(since.timestamp_millis())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let bottle_id: String = row.get("bottle_id");
            let shown_at_ms: i64 = row.get("shown_at_ms");
            Ok((bottle_id, from_millis(shown_at_ms)?))
        })
        .collect()
}

/// Prune entries older than `window` and record `bottle_ids` as shown
pub async fn mark_shown(
    pool: &SqlitePool,
    scope: &str,
    bottle_ids: &[String],
    shown_at: DateTime<Utc>,
    window: Duration,
) -> Result<()> {
    let cutoff = crate::time::before(shown_at, window).timestamp_millis();
    let shown_at_ms = shown_at.timestamp_millis();

    let mut tx = pool.begin().await?;

    let pruned = sqlx::query("DELETE FROM rotation_state WHERE scope = ? AND shown_at_ms < ?")
        .bind(scope)
        .bind(cutoff)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for bottle_id in bottle_ids {
        sqlx::query(
            r#"
            INSERT INTO rotation_state (scope, bottle_id, shown_at_ms)
            VALUES (?, ?, ?)
            ON CONFLICT(scope, bottle_id) DO UPDATE SET
                shown_at_ms = MAX(shown_at_ms, excluded.shown_at_ms)
            "#,
        )
        .bind(scope)
        .bind(bottle_id)
        .bind(shown_at_ms)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    debug!(
        scope = scope,
        pruned = pruned,
        marked = bottle_ids.len(),
        "Rotation state updated"
    );

    Ok(())
}
