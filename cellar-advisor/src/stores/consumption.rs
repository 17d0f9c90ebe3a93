//! Consumption history

use async_trait::async_trait;
use cellar_common::db::consumption;
use cellar_common::Result;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

#[async_trait]
pub trait ConsumptionHistory: Send + Sync {
    async fn record_opened(&self, user: &str, bottle_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Distinct bottle ids `user` opened at or after `since`
    async fn opened_since(&self, user: &str, since: DateTime<Utc>) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
pub struct InMemoryConsumptionHistory {
    events: RwLock<HashMap<String, Vec<(String, DateTime<Utc>)>>>,
}

impl InMemoryConsumptionHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsumptionHistory for InMemoryConsumptionHistory {
    async fn record_opened(&self, user: &str, bottle_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.events
            .write()
            .await
            .entry(user.to_string())
            .or_default()
            .push((bottle_id.to_string(), at));
        Ok(())
    }

    async fn opened_since(&self, user: &str, since: DateTime<Utc>) -> Result<Vec<String>> {
        let events = self.events.read().await;
        let ids: BTreeSet<String> = events
            .get(user)
            .into_iter()
            .flatten()
            .filter(|(_, at)| *at >= since)
            .map(|(id, _)| id.clone())
            .collect();
        Ok(ids.into_iter().collect())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteConsumptionHistory {
    pool: SqlitePool,
}

impl SqliteConsumptionHistory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConsumptionHistory for SqliteConsumptionHistory {
    async fn record_opened(&self, user: &str, bottle_id: &str, at: DateTime<Utc>) -> Result<()> {
        consumption::record_opened(&self.pool, user, bottle_id, at).await
    }

    async fn opened_since(&self, user: &str, since: DateTime<Utc>) -> Result<Vec<String>> {
        consumption::opened_since(&self.pool, user, since).await
    }
}
