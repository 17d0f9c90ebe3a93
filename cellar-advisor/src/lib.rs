//! # Cellar Advisor
//!
//! Deterministic readiness and recommendation engine for a personal wine
//! cellar.
//!
//! **Data flow:** bottle records -> structural profile (cached, AI or
//! heuristic) -> readiness verdict -> vintage consistency check across a wine
//! family -> situational recommendation shortlist.
//!
//! The engine functions are pure and synchronous; the profile chain and the
//! recommendation service add async access to caches, stores and the AI
//! profile generator.

pub mod error;
pub mod services;
pub mod stores;
pub mod types;
pub mod validators;

pub use error::ProfileError;
pub use services::{
    classify_readiness, classify_wine, estimate_profile, pairing_score, plan_courses, recommend,
};
pub use types::{ProfileMetadata, RandomSource, ReadinessContext, SeededRandom, ThreadRandom};
pub use validators::validate_family;
