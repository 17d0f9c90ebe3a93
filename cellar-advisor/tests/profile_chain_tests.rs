//! Profile provider chain tests
//!
//! Fake generators stand in for the AI service to exercise fallback,
//! timeout and persistence behavior.

use async_trait::async_trait;
use cellar_advisor::error::ProfileError;
use cellar_advisor::services::profile_chain::{profile_cache_key, ProfileChain, ProfileGenerator};
use cellar_advisor::stores::{InMemoryProfileCache, ProfileCache, SqliteProfileCache};
use cellar_advisor::ProfileMetadata;
use cellar_common::models::{
    InventoryBottle, ProfileConfidence, ProfileSource, StructuralProfile, Wine, WineType,
};
use cellar_common::time;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn failing() -> Option<Arc<dyn ProfileGenerator>> {
    Some(Arc::new(FailingGenerator) as Arc<dyn ProfileGenerator>)
}

fn wine() -> Wine {
    InventoryBottle {
        producer: "Ridge".to_string(),
        name: "Monte Bello".to_string(),
        vintage: Some(2016),
        wine_type: Some(WineType::Red),
        region: Some("Santa Cruz Mountains".to_string()),
        grapes: vec!["Cabernet Sauvignon".to_string()],
        quantity: 1,
        ..Default::default()
    }
    .to_wine()
}

fn ai_profile(generated_at: DateTime<Utc>) -> StructuralProfile {
    StructuralProfile {
        body: 5,
        tannin: 4,
        acidity: 4,
        oak: 4,
        sweetness: 0,
        alcohol: 4,
        power: 8,
        style_tags: vec!["structured".to_string()],
        confidence: ProfileConfidence::High,
        source: ProfileSource::Ai,
        generated_at,
    }
}

/// Generator answering with a fixed profile and counting calls
struct FixedGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl ProfileGenerator for FixedGenerator {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn generate(&self, _metadata: &ProfileMetadata) -> Result<StructuralProfile, ProfileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ai_profile(time::now()))
    }
}

struct FailingGenerator;

#[async_trait]
impl ProfileGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _metadata: &ProfileMetadata) -> Result<StructuralProfile, ProfileError> {
        Err(ProfileError::Unavailable("service down".to_string()))
    }
}

struct SlowGenerator;

#[async_trait]
impl ProfileGenerator for SlowGenerator {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn generate(&self, _metadata: &ProfileMetadata) -> Result<StructuralProfile, ProfileError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(ai_profile(time::now()))
    }
}

#[tokio::test]
async fn test_generator_result_wins_and_is_cached() {
    let cache = Arc::new(InMemoryProfileCache::new());
    let generator = Arc::new(FixedGenerator {
        calls: AtomicUsize::new(0),
    });
    let dyn_generator: Arc<dyn ProfileGenerator> = generator.clone();
    let chain = ProfileChain::new(cache.clone(), Some(dyn_generator), 30, 1000);

    let first = chain.resolve(&wine()).await;
    assert_eq!(first.provider, "fixed");
    assert_eq!(first.profile.source, ProfileSource::Ai);

    // Second resolution is served from the cache without calling the generator
    let second = chain.resolve(&wine()).await;
    assert_eq!(second.provider, "cache");
    assert_eq!(second.profile, first.profile);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_generator_falls_back_to_heuristic() {
    let cache = Arc::new(InMemoryProfileCache::new());
    let chain = ProfileChain::new(cache.clone(), failing(), 30, 1000);

    let resolved = chain.resolve(&wine()).await;

    assert_eq!(resolved.provider, "heuristic");
    assert_eq!(resolved.profile.confidence, ProfileConfidence::Low);
    assert_eq!(resolved.profile.source, ProfileSource::Heuristic);

    // Heuristic result persisted so the next call is idempotent
    let cached = cache.get(&profile_cache_key(&wine())).await.unwrap();
    assert_eq!(cached, Some(resolved.profile.clone()));
    let again = chain.resolve(&wine()).await;
    assert_eq!(again.provider, "cache");
    assert_eq!(again.profile, resolved.profile);
}

#[tokio::test]
async fn test_slow_generator_times_out() {
    let chain = ProfileChain::new(
        Arc::new(InMemoryProfileCache::new()),
        Some(Arc::new(SlowGenerator) as Arc<dyn ProfileGenerator>),
        30,
        50,
    );

    let started = std::time::Instant::now();
    let resolved = chain.resolve(&wine()).await;

    assert_eq!(resolved.provider, "heuristic");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_stale_cache_entry_is_regenerated() {
    let cache = Arc::new(InMemoryProfileCache::new());
    let key = profile_cache_key(&wine());
    let old = ai_profile(time::now() - time::days(45));
    cache.put(&key, &old).await.unwrap();

    let chain = ProfileChain::new(cache.clone(), None, 30, 1000);
    let resolved = chain.resolve(&wine()).await;

    assert_eq!(resolved.provider, "heuristic");
    assert_ne!(resolved.profile, old);
    assert_eq!(cache.get(&key).await.unwrap(), Some(resolved.profile));
}

#[tokio::test]
async fn test_fresh_inline_profile_used_first() {
    let mut w = wine();
    w.profile = Some(ai_profile(time::now() - time::days(1)));
    let chain = ProfileChain::new(
        Arc::new(InMemoryProfileCache::new()),
        failing(),
        30,
        1000,
    );

    let resolved = chain.resolve(&w).await;
    assert_eq!(resolved.provider, "inline");
    assert_eq!(Some(resolved.profile), w.profile);
}

#[tokio::test]
async fn test_heuristic_only_chain() {
    let chain = ProfileChain::heuristic_only();
    assert_eq!(chain.provider_names(), vec!["heuristic"]);
    let resolved = chain.resolve(&Wine::default()).await;
    assert!(resolved.profile.is_within_bounds());
}

#[tokio::test]
async fn test_sqlite_cache_backs_the_chain() {
    let pool = cellar_common::db::init_in_memory().await.unwrap();
    let cache = Arc::new(SqliteProfileCache::new(pool));
    let chain = ProfileChain::new(cache.clone(), failing(), 30, 1000);

    let first = chain.resolve(&wine()).await;
    let second = chain.resolve(&wine()).await;

    assert_eq!(first.provider, "heuristic");
    assert_eq!(second.provider, "cache");
    assert_eq!(first.profile, second.profile);
}
