//! Core types and seams for the advisor engine
//!
//! - `ProfileMetadata`: the inputs the profile estimator and generators read
//! - `ReadinessContext`: the "as of" year for readiness classification
//! - `RandomSource`: injectable jitter source for recommendation scoring

use cellar_common::models::{Wine, WineIdentity, WineType};
use cellar_common::time;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ============================================================================
// Profile inputs
// ============================================================================

/// Wine metadata consumed by structural profile estimation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileMetadata {
    pub wine_type: Option<WineType>,
    pub region: Option<String>,
    pub grapes: Vec<String>,
    /// Free-text style descriptor ("Riserva", "Brut Nature", ...)
    pub style: Option<String>,
}

impl ProfileMetadata {
    pub fn from_wine(wine: &Wine) -> Self {
        Self {
            wine_type: wine.wine_type,
            region: wine.region.clone(),
            grapes: wine.grapes.clone(),
            style: wine.style.clone(),
        }
    }
}

// ============================================================================
// Readiness inputs
// ============================================================================

/// Point in time a readiness verdict is computed for
///
/// `computed_at` is stamped on every verdict; `for_year` pins it so that two
/// classifications with the same inputs are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessContext {
    pub current_year: i32,
    pub computed_at: DateTime<Utc>,
}

impl ReadinessContext {
    pub fn now() -> Self {
        Self {
            current_year: time::current_year(),
            computed_at: time::now(),
        }
    }

    pub fn for_year(current_year: i32) -> Self {
        Self {
            current_year,
            computed_at: time::start_of_year(current_year),
        }
    }
}

/// Cache key for a computed verdict
///
/// A verdict stays valid while the wine, vintage, profile timestamp and logic
/// version are unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerdictCacheKey {
    pub identity: WineIdentity,
    pub vintage: Option<i32>,
    pub profile_generated_at: Option<DateTime<Utc>>,
    pub version: u32,
}

impl VerdictCacheKey {
    pub fn for_wine(wine: &Wine, version: u32) -> Self {
        Self {
            identity: wine.identity(),
            vintage: wine.vintage,
            profile_generated_at: wine.profile.as_ref().map(|p| p.generated_at),
            version,
        }
    }
}

// ============================================================================
// Randomness
// ============================================================================

/// Source of uniform values in [0, 1)
pub trait RandomSource {
    fn next(&mut self) -> f64;
}

/// Thread-local RNG; used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Seeded RNG for reproducible rankings
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
