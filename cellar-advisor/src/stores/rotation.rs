//! Rotation state store
//!
//! `mark_shown` is the only write and must be atomic per scope: it prunes
//! expired entries and records the new ones in a single step, so two
//! recommendations for the same scope never lose each other's picks.

use crate::services::rotation::RotationState;
use async_trait::async_trait;
use cellar_common::db::rotation;
use cellar_common::{time, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait RotationStore: Send + Sync {
    /// Unexpired rotation state for `scope`
    async fn load(&self, scope: &str, window_days: i64, now: DateTime<Utc>) -> Result<RotationState>;

    /// Prune, then record `bottle_ids` as shown at `now`
    async fn mark_shown(
        &self,
        scope: &str,
        bottle_ids: &[String],
        window_days: i64,
        now: DateTime<Utc>,
    ) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRotationStore {
    scopes: Mutex<HashMap<String, RotationState>>,
}

impl InMemoryRotationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RotationStore for InMemoryRotationStore {
    async fn load(&self, scope: &str, window_days: i64, now: DateTime<Utc>) -> Result<RotationState> {
        let scopes = self.scopes.lock().await;
        let mut state = match scopes.get(scope) {
            Some(stored) => RotationState::from_entries(
                window_days,
                stored
                    .entries()
                    .iter()
                    .map(|e| (e.bottle_id.clone(), e.shown_at)),
            ),
            None => RotationState::new(window_days),
        };
        state.prune(now);
        Ok(state)
    }

    async fn mark_shown(
        &self,
        scope: &str,
        bottle_ids: &[String],
        window_days: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut scopes = self.scopes.lock().await;
        scopes
            .entry(scope.to_string())
            .or_insert_with(|| RotationState::new(window_days))
            .mark_shown(bottle_ids, now);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteRotationStore {
    pool: SqlitePool,
}

impl SqliteRotationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RotationStore for SqliteRotationStore {
    async fn load(&self, scope: &str, window_days: i64, now: DateTime<Utc>) -> Result<RotationState> {
        let since = time::before(now, time::days(window_days));
        let entries = rotation::load_rotation(&self.pool, scope, since).await?;
        Ok(RotationState::from_entries(window_days, entries))
    }

    async fn mark_shown(
        &self,
        scope: &str,
        bottle_ids: &[String],
        window_days: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        rotation::mark_shown(&self.pool, scope, bottle_ids, now, time::days(window_days)).await
    }
}
