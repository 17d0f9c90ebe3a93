//! Readiness Classifier
//!
//! Decides whether a bottle is ready to drink, its drinking window and how
//! confident that judgment is.
//!
//! # Dispatch
//! - Sparkling: age < 3 READY/HIGH, < 5 READY/MEDIUM, else READY/LOW
//! - White/Rosé: age < 2 READY/HIGH, < 5 READY/MEDIUM, else READY/LOW
//! - Red: aging potential (from the structural profile, or medium without
//!   one) selects a threshold table; age is placed into the
//!   young / prime / mature / fading bands of that table
//!
//! Invalid input (vintage outside [1900, current year + 1], no vintage, or no
//! wine type) never fails: it produces a READY/LOW default verdict that says
//! so in its reasons.

use crate::types::ReadinessContext;
use cellar_common::models::{
    DrinkWindow, ReadinessLabel, ReadinessVerdict, StructuralProfile, VerdictConfidence, Wine,
    WineType,
};
use std::fmt;
use tracing::debug;

/// Bump whenever thresholds or band logic change, to invalidate cached verdicts
pub const READINESS_LOGIC_VERSION: u32 = 1;

/// Oldest vintage accepted as valid
pub const MIN_VINTAGE: i32 = 1900;

/// Aging score at or above which potential is high / medium (0-15 scale)
const HIGH_POTENTIAL_SCORE: f64 = 10.0;
const MEDIUM_POTENTIAL_SCORE: f64 = 6.0;
const AGING_SCORE_SCALE: f64 = 15.0;

/// Aging score weights: tannin, body, oak, power (halved to 1-5), acidity
const AGING_TANNIN_WEIGHT: f64 = 1.0;
const AGING_BODY_WEIGHT: f64 = 0.8;
const AGING_OAK_WEIGHT: f64 = 0.5;
const AGING_POWER_WEIGHT: f64 = 0.7;
const AGING_ACIDITY_WEIGHT: f64 = 0.5;

/// Window lengths for wines past their prime
const MATURE_WINDOW_YEARS: i32 = 3;
const FADING_WINDOW_YEARS: i32 = 2;

/// How long a red wine can develop in bottle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgingPotential {
    Low,
    Medium,
    High,
}

impl AgingPotential {
    pub fn thresholds(&self) -> AgingThresholds {
        match self {
            AgingPotential::High => AgingThresholds {
                young: 5,
                prime_start: 5,
                prime_end: 20,
                mature: 25,
            },
            AgingPotential::Medium => AgingThresholds {
                young: 3,
                prime_start: 3,
                prime_end: 12,
                mature: 18,
            },
            AgingPotential::Low => AgingThresholds {
                young: 2,
                prime_start: 2,
                prime_end: 8,
                mature: 12,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgingPotential::Low => "low",
            AgingPotential::Medium => "medium",
            AgingPotential::High => "high",
        }
    }
}

impl fmt::Display for AgingPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age boundaries (years) for one aging-potential tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingThresholds {
    /// Below this age the wine is too young
    pub young: i32,
    pub prime_start: i32,
    /// At or beyond this age the wine is past its prime
    pub prime_end: i32,
    /// At or beyond this age the wine may be fading
    pub mature: i32,
}

/// Everything the classifier reads
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadinessInput<'a> {
    pub wine_type: Option<WineType>,
    pub vintage: Option<i32>,
    pub profile: Option<&'a StructuralProfile>,
    pub region: Option<&'a str>,
    pub producer: Option<&'a str>,
    pub grapes: &'a [String],
}

impl<'a> ReadinessInput<'a> {
    pub fn from_wine(wine: &'a Wine) -> Self {
        Self {
            wine_type: wine.wine_type,
            vintage: wine.vintage,
            profile: wine.profile.as_ref(),
            region: wine.region.as_deref(),
            producer: Some(wine.producer.as_str()),
            grapes: &wine.grapes,
        }
    }
}

/// Weighted structure score on a 0-15 scale
pub fn aging_score(profile: &StructuralProfile) -> f64 {
    let raw = profile.tannin as f64 * AGING_TANNIN_WEIGHT
        + profile.body as f64 * AGING_BODY_WEIGHT
        + profile.oak as f64 * AGING_OAK_WEIGHT
        + (profile.power as f64 / 2.0) * AGING_POWER_WEIGHT
        + profile.acidity as f64 * AGING_ACIDITY_WEIGHT;
    let max = StructuralProfile::AXIS_MAX as f64
        * (AGING_TANNIN_WEIGHT
            + AGING_BODY_WEIGHT
            + AGING_OAK_WEIGHT
            + AGING_POWER_WEIGHT
            + AGING_ACIDITY_WEIGHT);

    (raw / max * AGING_SCORE_SCALE).clamp(0.0, AGING_SCORE_SCALE)
}

/// Aging potential from a profile; medium when no profile is known
pub fn aging_potential(profile: Option<&StructuralProfile>) -> AgingPotential {
    match profile {
        Some(profile) => {
            let score = aging_score(profile);
            if score >= HIGH_POTENTIAL_SCORE {
                AgingPotential::High
            } else if score >= MEDIUM_POTENTIAL_SCORE {
                AgingPotential::Medium
            } else {
                AgingPotential::Low
            }
        }
        None => AgingPotential::Medium,
    }
}

/// Classify a wine using its own metadata and cached profile
pub fn classify_wine(wine: &Wine, ctx: &ReadinessContext) -> ReadinessVerdict {
    classify_readiness(&ReadinessInput::from_wine(wine), ctx)
}

/// Classify readiness for one wine
///
/// Pure: identical input and context yield identical verdicts.
pub fn classify_readiness(input: &ReadinessInput<'_>, ctx: &ReadinessContext) -> ReadinessVerdict {
    let current_year = ctx.current_year;

    let (wine_type, vintage) = match (input.wine_type, input.vintage) {
        (Some(wine_type), Some(vintage))
            if (MIN_VINTAGE..=current_year + 1).contains(&vintage) =>
        {
            (wine_type, vintage)
        }
        _ => return fallback_verdict(input, ctx),
    };

    let age = (current_year - vintage).max(0);

    let mut verdict = match wine_type {
        WineType::Sparkling => classify_sparkling(age, ctx),
        WineType::White | WineType::Rose => classify_still_light(wine_type, age, ctx),
        WineType::Red => classify_red(age, input.profile, ctx),
    };

    enrich_reasons(&mut verdict, input);

    debug!(
        producer = input.producer.unwrap_or(""),
        wine_type = %wine_type,
        vintage,
        age,
        label = %verdict.label,
        confidence = ?verdict.confidence,
        "Readiness classified"
    );

    verdict
}

fn classify_sparkling(age: i32, ctx: &ReadinessContext) -> ReadinessVerdict {
    let age_reason = format!("Sparkling wine is {} year(s) past vintage", age);

    if age < 3 {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::High,
            vec![age_reason, "Sparkling wine is at its freshest when young".to_string()],
            None,
            ctx,
        )
    } else if age < 5 {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::Medium,
            vec![
                age_reason,
                "Still lively, though primary fruit is beginning to soften".to_string(),
            ],
            None,
            ctx,
        )
    } else {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::Low,
            vec![
                age_reason,
                "Older sparkling wine may have lost some of its mousse".to_string(),
            ],
            Some("Quality of older sparkling wine depends heavily on storage conditions".to_string()),
            ctx,
        )
    }
}

fn classify_still_light(wine_type: WineType, age: i32, ctx: &ReadinessContext) -> ReadinessVerdict {
    let kind = if wine_type == WineType::Rose { "Rosé" } else { "White" };
    let age_reason = format!("{} wine is {} year(s) past vintage", kind, age);

    if age < 2 {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::High,
            vec![age_reason, format!("{} wines are best enjoyed young and fresh", kind)],
            None,
            ctx,
        )
    } else if age < 5 {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::Medium,
            vec![age_reason, "Drinking well, best opened within the next year or two".to_string()],
            None,
            ctx,
        )
    } else {
        verdict(
            ReadinessLabel::Ready,
            None,
            VerdictConfidence::Low,
            vec![
                age_reason,
                "Beyond the usual window for its style; freshness may have faded".to_string(),
            ],
            None,
            ctx,
        )
    }
}

fn classify_red(
    age: i32,
    profile: Option<&StructuralProfile>,
    ctx: &ReadinessContext,
) -> ReadinessVerdict {
    let current_year = ctx.current_year;
    let potential = aging_potential(profile);
    let t = potential.thresholds();

    let mut reasons = vec![format!(
        "Red wine is {} year(s) past vintage with {} aging potential",
        age, potential
    )];
    match profile {
        Some(p) => reasons.push(format!(
            "Aging potential derived from structure (tannin {}/5, body {}/5, oak {}/5)",
            p.tannin, p.body, p.oak
        )),
        None => reasons.push("No structural profile available; assumed medium aging potential".to_string()),
    }

    if age < t.young {
        let window = DrinkWindow::new(
            current_year + (t.young - age),
            current_year + (t.prime_end - age),
        );
        reasons.push(format!(
            "Too young: needs about {} more year(s); drink {}-{}",
            t.young - age,
            window.start,
            window.end
        ));
        let confidence = if profile.is_some() {
            VerdictConfidence::Medium
        } else {
            VerdictConfidence::Low
        };
        verdict(ReadinessLabel::Hold, Some(window), confidence, reasons, None, ctx)
    } else if age < t.prime_start + 2 {
        let window = DrinkWindow::new(current_year, current_year + (t.prime_end - age));
        reasons.push(format!(
            "Entering its drinking window; drink now through {}",
            window.end
        ));
        verdict(ReadinessLabel::Ready, Some(window), VerdictConfidence::High, reasons, None, ctx)
    } else if age < t.prime_end {
        let window = DrinkWindow::new(current_year, current_year + (t.prime_end - age));
        reasons.push(format!("In its prime drinking window through {}", window.end));
        verdict(ReadinessLabel::Ready, Some(window), VerdictConfidence::High, reasons, None, ctx)
    } else if age < t.mature {
        let window = DrinkWindow::new(current_year, current_year + MATURE_WINDOW_YEARS);
        reasons.push(format!(
            "Past its prime but still drinking well; best by {}",
            window.end
        ));
        verdict(
            ReadinessLabel::Ready,
            Some(window),
            VerdictConfidence::Medium,
            reasons,
            Some("Condition of mature bottles depends on storage conditions".to_string()),
            ctx,
        )
    } else {
        let window = DrinkWindow::new(current_year, current_year + FADING_WINDOW_YEARS);
        reasons.push(format!(
            "Beyond the typical lifespan for its aging potential; may be fading, drink by {}",
            window.end
        ));
        verdict(ReadinessLabel::Ready, Some(window), VerdictConfidence::Low, reasons, None, ctx)
    }
}

fn fallback_verdict(input: &ReadinessInput<'_>, ctx: &ReadinessContext) -> ReadinessVerdict {
    let current_year = ctx.current_year;

    let problem = match (input.vintage, input.wine_type) {
        (None, _) => "No vintage year recorded; age cannot be determined".to_string(),
        (Some(v), _) if !(MIN_VINTAGE..=current_year + 1).contains(&v) => format!(
            "Vintage {} is invalid (expected {}-{})",
            v,
            MIN_VINTAGE,
            current_year + 1
        ),
        (Some(_), None) => "Wine type unknown; no readiness rules apply".to_string(),
        (Some(_), Some(_)) => "Readiness inputs incomplete".to_string(),
    };

    debug!(
        vintage = ?input.vintage,
        wine_type = ?input.wine_type,
        "Readiness input invalid, using default verdict"
    );

    let mut verdict = verdict(
        ReadinessLabel::Ready,
        None,
        VerdictConfidence::Low,
        vec![problem, "Classified as ready to drink by default".to_string()],
        Some("Readiness could not be assessed from the available data; defaulted to READY".to_string()),
        ctx,
    );
    enrich_reasons(&mut verdict, input);
    verdict
}

/// Append context reasons; never alters label, window or confidence
fn enrich_reasons(verdict: &mut ReadinessVerdict, input: &ReadinessInput<'_>) {
    if let Some(region) = input.region.map(str::trim).filter(|r| !r.is_empty()) {
        verdict.reasons.push(format!("Region: {}", region));
    }

    let grapes: Vec<&str> = input
        .grapes
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect();
    if !grapes.is_empty() {
        verdict.reasons.push(format!("Grapes: {}", grapes.join(", ")));
    }
}

fn verdict(
    label: ReadinessLabel,
    window: Option<DrinkWindow>,
    confidence: VerdictConfidence,
    reasons: Vec<String>,
    assumptions: Option<String>,
    ctx: &ReadinessContext,
) -> ReadinessVerdict {
    ReadinessVerdict {
        label,
        window,
        confidence,
        reasons,
        assumptions,
        version: READINESS_LOGIC_VERSION,
        computed_at: ctx.computed_at,
    }
}
