//! Recommendation Scorer
//!
//! Ranks in-stock bottles against a situational context (meal, occasion,
//! vibe, constraints), folding in readiness, recent consumption and rotation
//! state.
//!
//! # Scoring (additive, base 50)
//! - Meal: one bonus per matched meal category, chosen by wine type
//! - Occasion: celebratory / date
//! - Vibe: special or surprise / casual
//! - Readiness: +20 PEAK_SOON, +15 inside drink window, +10 READY
//! - Penalties: -40 opened within the history window, -25 in rotation
//! - Jitter: uniform [0, 25) from the injected `RandomSource`
//!
//! # Selection
//! Sort by total descending (ties by bottle id), keep the top K, then prune
//! the rotation state and mark the picks as shown.

use crate::services::rotation::RotationState;
use crate::types::{RandomSource, ThreadRandom};
use cellar_common::models::{InventoryBottle, ReadinessLabel, ReadinessVerdict, WineType};
use cellar_common::time;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const BASE_SCORE: f64 = 50.0;
const MAX_JITTER: f64 = 25.0;
const RECENTLY_OPENED_PENALTY: f64 = -40.0;
const ROTATION_PENALTY: f64 = -25.0;

const PEAK_BONUS: f64 = 20.0;
const IN_WINDOW_BONUS: f64 = 15.0;
const READY_BONUS: f64 = 10.0;

/// A meal category: keywords matched by substring and a bonus per wine type
struct MealRule {
    category: &'static str,
    keywords: &'static [&'static str],
    bonuses: &'static [(WineType, f64)],
}

const MEAL_RULES: &[MealRule] = &[
    MealRule {
        category: "red meat",
        keywords: &["steak", "beef", "lamb"],
        bonuses: &[(WineType::Red, 30.0)],
    },
    MealRule {
        category: "seafood",
        keywords: &["fish", "seafood"],
        bonuses: &[(WineType::White, 30.0), (WineType::Sparkling, 20.0)],
    },
    MealRule {
        category: "spicy food",
        keywords: &["spicy"],
        bonuses: &[(WineType::White, 25.0), (WineType::Rose, 20.0)],
    },
    MealRule {
        category: "pizza or pasta",
        keywords: &["pizza", "pasta"],
        bonuses: &[(WineType::Red, 25.0)],
    },
    MealRule {
        category: "cheese",
        keywords: &["cheese"],
        bonuses: &[
            (WineType::Red, 15.0),
            (WineType::White, 15.0),
            (WineType::Sparkling, 25.0),
        ],
    },
    MealRule {
        category: "poultry",
        keywords: &["chicken", "poultry"],
        bonuses: &[(WineType::White, 20.0), (WineType::Rose, 15.0), (WineType::Red, 10.0)],
    },
];

/// Hard filters applied before scoring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConstraints {
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub prefer_ready_only: bool,
}

/// Situational request context; categories are matched by substring
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub occasion: Option<String>,
    #[serde(default)]
    pub vibe: Option<String>,
    #[serde(default)]
    pub constraints: RecommendationConstraints,
}

/// A bottle eligible for recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub bottle_id: String,
    pub name: String,
    pub wine_type: Option<WineType>,
    pub price: Option<f64>,
    pub quantity: u32,
    pub verdict: ReadinessVerdict,
    /// Opened by the user within the history window
    #[serde(default)]
    pub opened_recently: bool,
}

impl Candidate {
    pub fn from_bottle(bottle: &InventoryBottle, verdict: ReadinessVerdict) -> Self {
        let wine = bottle.to_wine();
        Self {
            bottle_id: bottle.id.clone().unwrap_or_else(|| wine.id.clone()),
            name: wine.display_name(),
            wine_type: bottle.wine_type,
            price: bottle.price,
            quantity: bottle.quantity,
            verdict,
            opened_recently: false,
        }
    }
}

/// Per-component score contributions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub meal: f64,
    pub occasion: f64,
    pub vibe: f64,
    pub readiness: f64,
    pub history_penalty: f64,
    pub rotation_penalty: f64,
    pub jitter: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.base
            + self.meal
            + self.occasion
            + self.vibe
            + self.readiness
            + self.history_penalty
            + self.rotation_penalty
            + self.jitter
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

/// Ranked shortlist plus the updated rotation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub picks: Vec<ScoredCandidate>,
    pub message: Option<String>,
    /// True when constraints removed every bottle and were ignored
    pub relaxed_constraints: bool,
    pub rotation: RotationState,
}

/// Recommender tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommenderConfig {
    /// Shortlist size
    pub top_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Recommendation Scorer
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(config: RecommenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Rank `candidates` and update `rotation`
    pub fn recommend(
        &self,
        context: &RecommendationContext,
        candidates: &[Candidate],
        mut rotation: RotationState,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> Recommendation {
        rotation.prune(now);

        if self.config.top_k == 0 {
            debug!("Shortlist size is zero, nothing to select");
            return Recommendation {
                picks: Vec::new(),
                message: Some("Shortlist size is zero; request at least one bottle".to_string()),
                relaxed_constraints: false,
                rotation,
            };
        }

        let (eligible, relaxed_constraints) = filter_candidates(context, candidates);
        if eligible.is_empty() {
            debug!(total = candidates.len(), "No bottles in stock to recommend");
            return Recommendation {
                picks: Vec::new(),
                message: Some("No bottles available to recommend; add bottles with quantity above zero".to_string()),
                relaxed_constraints: false,
                rotation,
            };
        }

        let mut scored: Vec<ScoredCandidate> = eligible
            .into_iter()
            .map(|c| self.score_candidate(context, c, &rotation, now, rng))
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.candidate.bottle_id.cmp(&b.candidate.bottle_id))
        });
        scored.truncate(self.config.top_k);

        let picked: Vec<&str> = scored.iter().map(|s| s.candidate.bottle_id.as_str()).collect();
        rotation.mark_shown(picked.as_slice(), now);

        debug!(
            picks = ?picked,
            relaxed_constraints,
            rotation_size = rotation.len(),
            "Recommendation selected"
        );

        let message = relaxed_constraints.then(|| {
            "No bottles matched the constraints; showing the best of the full cellar".to_string()
        });

        Recommendation {
            picks: scored,
            message,
            relaxed_constraints,
            rotation,
        }
    }

    /// Score one candidate, jitter included
    pub fn score_candidate(
        &self,
        context: &RecommendationContext,
        candidate: &Candidate,
        rotation: &RotationState,
        now: DateTime<Utc>,
        rng: &mut dyn RandomSource,
    ) -> ScoredCandidate {
        let mut reasons = Vec::new();
        let mut breakdown = ScoreBreakdown {
            base: BASE_SCORE,
            ..Default::default()
        };

        breakdown.meal = meal_bonus(context.meal_type.as_deref(), candidate, &mut reasons);
        breakdown.occasion = occasion_bonus(context.occasion.as_deref(), candidate, &mut reasons);
        breakdown.vibe = vibe_bonus(context.vibe.as_deref(), candidate, &mut reasons);
        breakdown.readiness = readiness_bonus(&candidate.verdict, now.year(), &mut reasons);

        if candidate.opened_recently {
            breakdown.history_penalty = RECENTLY_OPENED_PENALTY;
            reasons.push("Opened recently".to_string());
        }

        if rotation.contains(&candidate.bottle_id, now) {
            breakdown.rotation_penalty = ROTATION_PENALTY;
            reasons.push("Suggested recently".to_string());
        }

        breakdown.jitter = rng.next().clamp(0.0, 1.0) * MAX_JITTER;

        ScoredCandidate {
            candidate: candidate.clone(),
            score: breakdown.total(),
            breakdown,
            reasons,
        }
    }
}

/// Rank with default settings, thread randomness and the current time
pub fn recommend(
    context: &RecommendationContext,
    candidates: &[Candidate],
    rotation: RotationState,
) -> Recommendation {
    Recommender::default().recommend(context, candidates, rotation, time::now(), &mut ThreadRandom)
}

/// In-stock candidates passing the constraints, or every in-stock candidate
/// when the constraints leave nothing
fn filter_candidates<'a>(
    context: &RecommendationContext,
    candidates: &'a [Candidate],
) -> (Vec<&'a Candidate>, bool) {
    let in_stock: Vec<&Candidate> = candidates.iter().filter(|c| c.quantity > 0).collect();
    let constraints = &context.constraints;

    let filtered: Vec<&Candidate> = in_stock
        .iter()
        .copied()
        .filter(|c| match (constraints.max_price, c.price) {
            (Some(max), Some(price)) => price <= max,
            _ => true,
        })
        .filter(|c| !constraints.prefer_ready_only || c.verdict.label.is_drinkable())
        .collect();

    if filtered.is_empty() && !in_stock.is_empty() {
        (in_stock, true)
    } else {
        (filtered, false)
    }
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

fn meal_bonus(meal: Option<&str>, candidate: &Candidate, reasons: &mut Vec<String>) -> f64 {
    let (Some(meal), Some(wine_type)) = (meal, candidate.wine_type) else {
        return 0.0;
    };
    let meal = meal.to_lowercase();

    let mut bonus = 0.0;
    for rule in MEAL_RULES.iter().filter(|r| matches_any(&meal, r.keywords)) {
        if let Some((_, points)) = rule.bonuses.iter().find(|(t, _)| *t == wine_type) {
            bonus += points;
            reasons.push(format!("{} pairs well with {}", wine_type, rule.category));
        }
    }
    bonus
}

fn occasion_bonus(occasion: Option<&str>, candidate: &Candidate, reasons: &mut Vec<String>) -> f64 {
    let Some(occasion) = occasion else {
        return 0.0;
    };
    let occasion = occasion.to_lowercase();
    let mut bonus = 0.0;

    if matches_any(&occasion, &["celebrat"]) {
        if candidate.wine_type == Some(WineType::Sparkling) {
            bonus += 20.0;
            reasons.push("Bubbles for a celebration".to_string());
        }
        if candidate.price.is_some_and(|p| p > 50.0) {
            bonus += 10.0;
            reasons.push("A special bottle for a special occasion".to_string());
        }
    } else if matches_any(&occasion, &["date"]) {
        match candidate.wine_type {
            Some(WineType::Sparkling) => {
                bonus += 15.0;
                reasons.push("Sparkling sets a date-night mood".to_string());
            }
            Some(WineType::Red) => {
                bonus += 10.0;
                reasons.push("A red for date night".to_string());
            }
            _ => {}
        }
    }
    bonus
}

fn vibe_bonus(vibe: Option<&str>, candidate: &Candidate, reasons: &mut Vec<String>) -> f64 {
    let Some(vibe) = vibe else {
        return 0.0;
    };
    let vibe = vibe.to_lowercase();
    let mut bonus = 0.0;

    if matches_any(&vibe, &["special", "surprise"]) {
        if candidate.price.is_some_and(|p| p > 40.0) {
            bonus += 10.0;
            reasons.push("Something a little special".to_string());
        }
        if candidate.verdict.label == ReadinessLabel::PeakSoon {
            bonus += 15.0;
            reasons.push("Approaching its peak".to_string());
        }
    } else if matches_any(&vibe, &["casual"])
        && matches!(candidate.wine_type, Some(WineType::White) | Some(WineType::Rose))
    {
        bonus += 10.0;
        reasons.push("Easy-going for a casual evening".to_string());
    }
    bonus
}

fn readiness_bonus(verdict: &ReadinessVerdict, current_year: i32, reasons: &mut Vec<String>) -> f64 {
    if verdict.label == ReadinessLabel::PeakSoon {
        reasons.push("At or near its peak".to_string());
        PEAK_BONUS
    } else if verdict.in_window(current_year) {
        reasons.push("Inside its drinking window".to_string());
        IN_WINDOW_BONUS
    } else if verdict.label == ReadinessLabel::Ready {
        reasons.push("Ready to drink".to_string());
        READY_BONUS
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SeededRandom;
    use cellar_common::models::{DrinkWindow, VerdictConfidence};

    /// Always returns the same value
    struct FixedRandom(f64);

    impl RandomSource for FixedRandom {
        fn next(&mut self) -> f64 {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        time::start_of_year(2024)
    }

    fn verdict(label: ReadinessLabel, window: Option<DrinkWindow>) -> ReadinessVerdict {
        ReadinessVerdict {
            label,
            window,
            confidence: VerdictConfidence::High,
            reasons: vec!["a".to_string(), "b".to_string()],
            assumptions: None,
            version: 1,
            computed_at: now(),
        }
    }

    fn candidate(id: &str, wine_type: WineType, price: f64, label: ReadinessLabel) -> Candidate {
        Candidate {
            bottle_id: id.to_string(),
            name: id.to_string(),
            wine_type: Some(wine_type),
            price: Some(price),
            quantity: 1,
            verdict: verdict(label, None),
            opened_recently: false,
        }
    }

    fn recommender(top_k: usize) -> Recommender {
        Recommender::new(RecommenderConfig { top_k })
    }

    #[test]
    fn test_meal_bonus_prefers_matching_type() {
        let context = RecommendationContext {
            meal_type: Some("Grilled Steak".to_string()),
            ..Default::default()
        };
        let candidates = vec![
            candidate("red", WineType::Red, 20.0, ReadinessLabel::Ready),
            candidate("white", WineType::White, 20.0, ReadinessLabel::Ready),
        ];

        let rec = recommender(1).recommend(
            &context,
            &candidates,
            RotationState::default(),
            now(),
            &mut FixedRandom(0.0),
        );

        assert_eq!(rec.picks.len(), 1);
        assert_eq!(rec.picks[0].candidate.bottle_id, "red");
        assert_eq!(rec.picks[0].breakdown.meal, 30.0);
        assert_eq!(rec.picks[0].score, 50.0 + 30.0 + 10.0);
    }

    #[test]
    fn test_cheese_bonus_per_type() {
        let context = RecommendationContext {
            meal_type: Some("cheese board".to_string()),
            ..Default::default()
        };
        let r = recommender(3);
        let meal_score = |wine_type| {
            let c = candidate("x", wine_type, 10.0, ReadinessLabel::Hold);
            r.score_candidate(&context, &c, &RotationState::default(), now(), &mut FixedRandom(0.0))
                .breakdown
                .meal
        };
        assert_eq!(meal_score(WineType::Red), 15.0);
        assert_eq!(meal_score(WineType::White), 15.0);
        assert_eq!(meal_score(WineType::Sparkling), 25.0);
        assert_eq!(meal_score(WineType::Rose), 0.0);
    }

    #[test]
    fn test_occasion_and_vibe_bonuses() {
        let r = recommender(3);
        let celebratory = RecommendationContext {
            occasion: Some("Celebration".to_string()),
            vibe: Some("surprise me".to_string()),
            ..Default::default()
        };
        let scored = r.score_candidate(
            &celebratory,
            &candidate("champ", WineType::Sparkling, 80.0, ReadinessLabel::PeakSoon),
            &RotationState::default(),
            now(),
            &mut FixedRandom(0.0),
        );
        assert_eq!(scored.breakdown.occasion, 30.0);
        assert_eq!(scored.breakdown.vibe, 25.0);
        assert_eq!(scored.breakdown.readiness, 20.0);

        let casual = RecommendationContext {
            vibe: Some("casual".to_string()),
            ..Default::default()
        };
        let scored = r.score_candidate(
            &casual,
            &candidate("rose", WineType::Rose, 12.0, ReadinessLabel::Ready),
            &RotationState::default(),
            now(),
            &mut FixedRandom(0.0),
        );
        assert_eq!(scored.breakdown.vibe, 10.0);
    }

    #[test]
    fn test_readiness_bonus_tiers() {
        let r = recommender(3);
        let ctx = RecommendationContext::default();
        let mut c = candidate("x", WineType::Red, 10.0, ReadinessLabel::Ready);
        c.verdict.window = Some(DrinkWindow::new(2022, 2030));
        let in_window = r.score_candidate(&ctx, &c, &RotationState::default(), now(), &mut FixedRandom(0.0));
        assert_eq!(in_window.breakdown.readiness, 15.0);

        let hold = candidate("y", WineType::Red, 10.0, ReadinessLabel::Hold);
        let scored = r.score_candidate(&ctx, &hold, &RotationState::default(), now(), &mut FixedRandom(0.0));
        assert_eq!(scored.breakdown.readiness, 0.0);
    }

    #[test]
    fn test_history_and_rotation_penalties() {
        let r = recommender(3);
        let ctx = RecommendationContext::default();
        let mut c = candidate("x", WineType::Red, 10.0, ReadinessLabel::Ready);
        c.opened_recently = true;

        let mut rotation = RotationState::default();
        rotation.mark_shown(&["x"], now() - time::days(1));

        let scored = r.score_candidate(&ctx, &c, &rotation, now(), &mut FixedRandom(0.0));
        assert_eq!(scored.breakdown.history_penalty, -40.0);
        assert_eq!(scored.breakdown.rotation_penalty, -25.0);

        c.opened_recently = false;
        let scored = r.score_candidate(&ctx, &c, &RotationState::default(), now(), &mut FixedRandom(0.0));
        assert_eq!(scored.breakdown.history_penalty, 0.0);
        assert_eq!(scored.breakdown.rotation_penalty, 0.0);
    }

    #[test]
    fn test_jitter_within_range() {
        let r = recommender(3);
        let ctx = RecommendationContext::default();
        let c = candidate("x", WineType::Red, 10.0, ReadinessLabel::Hold);
        let mut rng = ThreadRandom;
        for _ in 0..200 {
            let scored = r.score_candidate(&ctx, &c, &RotationState::default(), now(), &mut rng);
            assert!(scored.breakdown.jitter >= 0.0 && scored.breakdown.jitter <= 25.0);
        }
    }

    #[test]
    fn test_constraints_relaxed_when_nothing_matches() {
        let context = RecommendationContext {
            constraints: RecommendationConstraints {
                max_price: Some(5.0),
                prefer_ready_only: true,
            },
            ..Default::default()
        };
        let candidates = vec![candidate("only", WineType::Red, 90.0, ReadinessLabel::Hold)];

        let rec = recommender(3).recommend(
            &context,
            &candidates,
            RotationState::default(),
            now(),
            &mut FixedRandom(0.5),
        );

        assert_eq!(rec.picks.len(), 1);
        assert!(rec.relaxed_constraints);
        assert!(rec.message.is_some());
    }

    #[test]
    fn test_constraints_filter_when_something_matches() {
        let context = RecommendationContext {
            constraints: RecommendationConstraints {
                max_price: Some(30.0),
                prefer_ready_only: false,
            },
            ..Default::default()
        };
        let candidates = vec![
            candidate("cheap", WineType::Red, 20.0, ReadinessLabel::Ready),
            candidate("pricey", WineType::Red, 90.0, ReadinessLabel::PeakSoon),
        ];
        let rec = recommender(3).recommend(
            &context,
            &candidates,
            RotationState::default(),
            now(),
            &mut FixedRandom(0.0),
        );
        assert_eq!(rec.picks.len(), 1);
        assert_eq!(rec.picks[0].candidate.bottle_id, "cheap");
        assert!(!rec.relaxed_constraints);
    }

    #[test]
    fn test_empty_cellar_returns_message() {
        let mut empty = candidate("gone", WineType::Red, 10.0, ReadinessLabel::Ready);
        empty.quantity = 0;
        let rec = recommender(3).recommend(
            &RecommendationContext::default(),
            &[empty],
            RotationState::default(),
            now(),
            &mut FixedRandom(0.0),
        );
        assert!(rec.picks.is_empty());
        assert!(rec.message.is_some());
        assert!(rec.rotation.is_empty());
    }

    #[test]
    fn test_picks_recorded_in_rotation() {
        let candidates = vec![
            candidate("a", WineType::Red, 10.0, ReadinessLabel::Ready),
            candidate("b", WineType::White, 10.0, ReadinessLabel::Ready),
            candidate("c", WineType::Rose, 10.0, ReadinessLabel::Ready),
        ];
        let rec = recommender(2).recommend(
            &RecommendationContext::default(),
            &candidates,
            RotationState::default(),
            now(),
            &mut SeededRandom::new(7),
        );

        assert_eq!(rec.picks.len(), 2);
        for pick in &rec.picks {
            assert!(rec.rotation.contains(&pick.candidate.bottle_id, now()));
        }
        assert_eq!(rec.rotation.len(), 2);
    }

    #[test]
    fn test_ties_broken_by_bottle_id() {
        let candidates = vec![
            candidate("b", WineType::Red, 10.0, ReadinessLabel::Ready),
            candidate("a", WineType::Red, 10.0, ReadinessLabel::Ready),
        ];
        let rec = recommender(2).recommend(
            &RecommendationContext::default(),
            &candidates,
            RotationState::default(),
            now(),
            &mut FixedRandom(0.3),
        );
        assert_eq!(rec.picks[0].candidate.bottle_id, "a");
        assert_eq!(rec.picks[1].candidate.bottle_id, "b");
    }

    #[test]
    fn test_zero_shortlist_size_returns_no_picks() {
        let candidates = vec![candidate("only", WineType::Red, 10.0, ReadinessLabel::Ready)];
        let rec = recommender(0).recommend(
            &RecommendationContext::default(),
            &candidates,
            RotationState::default(),
            now(),
            &mut FixedRandom(0.5),
        );

        assert!(rec.picks.is_empty());
        assert!(rec.message.is_some());
        assert!(rec.rotation.is_empty());
    }
}
