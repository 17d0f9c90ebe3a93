//! Engine services
//!
//! Pure, synchronous engine components:
//! - `profile_estimator` - heuristic structural profiles
//! - `readiness_classifier` - readiness verdicts and drink windows
//! - `recommender` - situational ranking with rotation state
//! - `food_pairing` / `course_planner` - pairing scores and multi-course plans
//!
//! Async wiring to external collaborators:
//! - `profile_chain` / `ai_profile_client` - cascading profile resolution
//! - `recommendation_service` - recommender backed by history and rotation stores

pub mod ai_profile_client;
pub mod course_planner;
pub mod food_pairing;
pub mod profile_chain;
pub mod profile_estimator;
pub mod readiness_classifier;
pub mod recommendation_service;
pub mod recommender;
pub mod rotation;

pub use ai_profile_client::HttpProfileGenerator;
pub use course_planner::{plan_courses, Course, CourseAssignment, PairingBottle};
pub use food_pairing::{pairing_explanation, pairing_score, CoursePosition, FoodProfile};
pub use profile_chain::{ProfileChain, ProfileGenerator, ProfileProvider, ResolvedProfile};
pub use profile_estimator::{estimate_profile, select_profile};
pub use readiness_classifier::{classify_readiness, classify_wine, ReadinessInput};
pub use recommendation_service::{RecommendationService, ServiceSettings};
pub use recommender::{
    recommend, Candidate, Recommendation, RecommendationConstraints, RecommendationContext,
    Recommender, RecommenderConfig, ScoredCandidate,
};
pub use rotation::RotationState;
