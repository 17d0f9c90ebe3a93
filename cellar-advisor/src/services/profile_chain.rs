//! Structural profile provider chain
//!
//! Providers are tried in order; the first one that yields a profile wins.
//! Failures are logged and skipped. The heuristic estimator is the terminal
//! case and always succeeds, so resolution never fails.
//!
//! # Default order
//! 1. Inline: the profile carried on the wine record, if fresh
//! 2. Cache: the profile cache, if fresh
//! 3. Generator: the AI profile generator, bounded by a timeout
//! 4. Heuristic: `estimate_profile` (terminal)
//!
//! Profiles from any provider other than the cache are written back to the
//! cache, so a second resolution of the same wine is served from it.

use crate::error::ProfileError;
use crate::services::profile_estimator::estimate_profile_at;
use crate::stores::ProfileCache;
use crate::types::ProfileMetadata;
use async_trait::async_trait;
use cellar_common::models::{StructuralProfile, Wine};
use cellar_common::time;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default staleness limit for cached profiles
pub const DEFAULT_PROFILE_MAX_AGE_DAYS: i64 = 30;

/// Produces a structural profile from wine metadata (AI service, ...)
#[async_trait]
pub trait ProfileGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, metadata: &ProfileMetadata) -> Result<StructuralProfile, ProfileError>;
}

/// One link of the chain
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// Provider name for provenance logging
    fn name(&self) -> &'static str;

    /// Whether a profile from this provider should be written to the cache
    fn persist_result(&self) -> bool {
        true
    }

    /// `Ok(None)` passes to the next provider
    async fn provide(
        &self,
        wine: &Wine,
        now: DateTime<Utc>,
    ) -> Result<Option<StructuralProfile>, ProfileError>;
}

/// Cache key for a wine: its id, or its identity and vintage when it has none
pub fn profile_cache_key(wine: &Wine) -> String {
    if !wine.id.trim().is_empty() {
        return wine.id.clone();
    }
    let identity = wine.identity();
    match wine.vintage {
        Some(v) => format!("{}|{}|{}", identity.producer, identity.name, v),
        None => format!("{}|{}|nv", identity.producer, identity.name),
    }
}

/// The wine record's own profile
pub struct InlineProfileProvider {
    max_age: Duration,
}

impl InlineProfileProvider {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }
}

#[async_trait]
impl ProfileProvider for InlineProfileProvider {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn provide(
        &self,
        wine: &Wine,
        now: DateTime<Utc>,
    ) -> Result<Option<StructuralProfile>, ProfileError> {
        Ok(wine
            .profile
            .as_ref()
            .filter(|p| p.is_within_bounds() && !p.is_stale(now, self.max_age))
            .cloned())
    }
}

/// Fresh profile cache hits
pub struct CachedProfileProvider {
    cache: Arc<dyn ProfileCache>,
    max_age: Duration,
}

impl CachedProfileProvider {
    pub fn new(cache: Arc<dyn ProfileCache>, max_age: Duration) -> Self {
        Self { cache, max_age }
    }
}

#[async_trait]
impl ProfileProvider for CachedProfileProvider {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn persist_result(&self) -> bool {
        false
    }

    async fn provide(
        &self,
        wine: &Wine,
        now: DateTime<Utc>,
    ) -> Result<Option<StructuralProfile>, ProfileError> {
        let key = profile_cache_key(wine);
        match self.cache.get(&key).await? {
            Some(profile) if profile.is_stale(now, self.max_age) => {
                debug!(wine_id = %key, generated_at = %profile.generated_at, "Cached profile is stale");
                Ok(None)
            }
            other => Ok(other),
        }
    }
}

/// AI generator bounded by a timeout
pub struct GeneratedProfileProvider {
    generator: Arc<dyn ProfileGenerator>,
    timeout_ms: u64,
}

impl GeneratedProfileProvider {
    pub fn new(generator: Arc<dyn ProfileGenerator>, timeout_ms: u64) -> Self {
        Self {
            generator,
            timeout_ms,
        }
    }
}

#[async_trait]
impl ProfileProvider for GeneratedProfileProvider {
    fn name(&self) -> &'static str {
        self.generator.name()
    }

    async fn provide(
        &self,
        wine: &Wine,
        _now: DateTime<Utc>,
    ) -> Result<Option<StructuralProfile>, ProfileError> {
        let metadata = ProfileMetadata::from_wine(wine);
        let limit = std::time::Duration::from_millis(self.timeout_ms);

        let profile = tokio::time::timeout(limit, self.generator.generate(&metadata))
            .await
            .map_err(|_| ProfileError::Timeout(self.timeout_ms))??;

        if !profile.is_within_bounds() {
            return Err(ProfileError::InvalidResponse(format!(
                "{} returned out-of-range axes",
                self.generator.name()
            )));
        }
        Ok(Some(profile))
    }
}

/// Rule-based estimate; never fails
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicProfileProvider;

impl HeuristicProfileProvider {
    pub fn estimate(&self, wine: &Wine, now: DateTime<Utc>) -> StructuralProfile {
        estimate_profile_at(&ProfileMetadata::from_wine(wine), now)
    }
}

#[async_trait]
impl ProfileProvider for HeuristicProfileProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn provide(
        &self,
        wine: &Wine,
        now: DateTime<Utc>,
    ) -> Result<Option<StructuralProfile>, ProfileError> {
        Ok(Some(self.estimate(wine, now)))
    }
}

/// A resolved profile and the provider it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub profile: StructuralProfile,
    pub provider: &'static str,
}

/// Ordered providers ending in the heuristic estimator
pub struct ProfileChain {
    providers: Vec<Box<dyn ProfileProvider>>,
    cache: Option<Arc<dyn ProfileCache>>,
    terminal: HeuristicProfileProvider,
}

impl ProfileChain {
    /// Heuristic only
    pub fn heuristic_only() -> Self {
        Self {
            providers: Vec::new(),
            cache: None,
            terminal: HeuristicProfileProvider,
        }
    }

    /// Inline, cache, optional generator, heuristic
    pub fn new(
        cache: Arc<dyn ProfileCache>,
        generator: Option<Arc<dyn ProfileGenerator>>,
        max_age_days: i64,
        timeout_ms: u64,
    ) -> Self {
        let max_age = time::days(max_age_days);
        let mut providers: Vec<Box<dyn ProfileProvider>> = vec![
            Box::new(InlineProfileProvider::new(max_age)),
            Box::new(CachedProfileProvider::new(cache.clone(), max_age)),
        ];
        if let Some(generator) = generator {
            providers.push(Box::new(GeneratedProfileProvider::new(generator, timeout_ms)));
        }

        Self {
            providers,
            cache: Some(cache),
            terminal: HeuristicProfileProvider,
        }
    }

    /// Custom provider list; `cache` receives persisted results
    pub fn with_providers(
        providers: Vec<Box<dyn ProfileProvider>>,
        cache: Option<Arc<dyn ProfileCache>>,
    ) -> Self {
        Self {
            providers,
            cache,
            terminal: HeuristicProfileProvider,
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once(self.terminal_name()))
            .collect()
    }

    fn terminal_name(&self) -> &'static str {
        "heuristic"
    }

    pub async fn resolve(&self, wine: &Wine) -> ResolvedProfile {
        self.resolve_at(wine, time::now()).await
    }

    /// Resolve a profile as of `now`
    pub async fn resolve_at(&self, wine: &Wine, now: DateTime<Utc>) -> ResolvedProfile {
        let key = profile_cache_key(wine);

        for provider in &self.providers {
            match provider.provide(wine, now).await {
                Ok(Some(profile)) => {
                    debug!(wine_id = %key, provider = provider.name(), "Profile resolved");
                    if provider.persist_result() {
                        self.persist(&key, &profile).await;
                    }
                    return ResolvedProfile {
                        profile,
                        provider: provider.name(),
                    };
                }
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        wine_id = %key,
                        provider = provider.name(),
                        error = %e,
                        "Profile provider failed, falling back"
                    );
                }
            }
        }

        let profile = self.terminal.estimate(wine, now);
        debug!(wine_id = %key, provider = self.terminal_name(), "Profile resolved");
        self.persist(&key, &profile).await;
        ResolvedProfile {
            profile,
            provider: self.terminal_name(),
        }
    }

    async fn persist(&self, key: &str, profile: &StructuralProfile) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(key, profile).await {
                warn!(wine_id = %key, error = %e, "Failed to persist profile");
            }
        }
    }
}
