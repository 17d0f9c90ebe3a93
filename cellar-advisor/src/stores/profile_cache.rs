//! Structural profile cache

use async_trait::async_trait;
use cellar_common::db::profiles;
use cellar_common::models::StructuralProfile;
use cellar_common::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Profile lookup keyed by wine id
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn get(&self, wine_id: &str) -> Result<Option<StructuralProfile>>;

    async fn put(&self, wine_id: &str, profile: &StructuralProfile) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryProfileCache {
    profiles: RwLock<HashMap<String, StructuralProfile>>,
}

impl InMemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.profiles.read().await.len()
    }
}

#[async_trait]
impl ProfileCache for InMemoryProfileCache {
    async fn get(&self, wine_id: &str) -> Result<Option<StructuralProfile>> {
        Ok(self.profiles.read().await.get(wine_id).cloned())
    }

    async fn put(&self, wine_id: &str, profile: &StructuralProfile) -> Result<()> {
        self.profiles
            .write()
            .await
            .insert(wine_id.to_string(), profile.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SqliteProfileCache {
    pool: SqlitePool,
}

impl SqliteProfileCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileCache for SqliteProfileCache {
    async fn get(&self, wine_id: &str) -> Result<Option<StructuralProfile>> {
        profiles::load_profile(&self.pool, wine_id).await
    }

    async fn put(&self, wine_id: &str, profile: &StructuralProfile) -> Result<()> {
        profiles::save_profile(&self.pool, wine_id, profile).await
    }
}
