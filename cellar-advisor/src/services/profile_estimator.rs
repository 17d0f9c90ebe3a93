//! Structural Profile Estimator
//!
//! Derives a body/tannin/acidity/oak/sweetness profile from wine metadata when
//! no fresher generated profile exists.
//!
//! # Algorithm
//! 1. Start from type-based base values
//! 2. Apply region, grape and style-descriptor rules in that order; every
//!    adjustment is clamped to the axis bounds immediately
//! 3. Compute power (1-10) from a weighted sum of the axes
//! 4. Top the style tags up to at least three
//!
//! Missing metadata simply skips the rules that would have used it, so the
//! estimator always returns a complete profile.

use crate::types::ProfileMetadata;
use cellar_common::models::{ProfileConfidence, ProfileSource, StructuralProfile, WineType};
use cellar_common::time;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Power weights: body, tannin, oak, acidity, sweetness
const BODY_WEIGHT: f64 = 2.0;
const TANNIN_WEIGHT: f64 = 1.5;
const OAK_WEIGHT: f64 = 1.0;
const ACIDITY_WEIGHT: f64 = 0.8;
const SWEETNESS_WEIGHT: f64 = 0.2;

/// Axis level at or above which a generic descriptive tag is earned
const TAG_THRESHOLD: i32 = 4;
const MIN_STYLE_TAGS: usize = 3;
const FILLER_TAGS: &[&str] = &["balanced", "food-friendly", "versatile"];

// ============================================================================
// Rule tables
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct AxisDelta {
    body: i32,
    tannin: i32,
    acidity: i32,
    oak: i32,
    sweetness: i32,
    alcohol: i32,
}

impl AxisDelta {
    const ZERO: AxisDelta = AxisDelta {
        body: 0,
        tannin: 0,
        acidity: 0,
        oak: 0,
        sweetness: 0,
        alcohol: 0,
    };
}

/// Keyword-triggered adjustment; fires at most once per estimate
struct Rule {
    name: &'static str,
    keywords: &'static [&'static str],
    delta: AxisDelta,
    tags: &'static [&'static str],
}

const REGION_RULES: &[Rule] = &[
    Rule {
        name: "bordeaux",
        keywords: &["bordeaux", "pauillac", "margaux", "saint-julien", "saint-émilion", "pomerol"],
        delta: AxisDelta { body: 1, tannin: 1, oak: 1, ..AxisDelta::ZERO },
        tags: &["structured", "age-worthy"],
    },
    Rule {
        name: "piedmont",
        keywords: &["barolo", "barbaresco", "piedmont", "piemonte"],
        delta: AxisDelta { body: 1, tannin: 2, ..AxisDelta::ZERO },
        tags: &["tannic", "age-worthy"],
    },
    Rule {
        name: "tuscany",
        keywords: &["brunello", "montalcino", "bolgheri"],
        delta: AxisDelta { body: 1, tannin: 1, oak: 1, ..AxisDelta::ZERO },
        tags: &["structured"],
    },
    Rule {
        name: "napa",
        keywords: &["napa", "sonoma"],
        delta: AxisDelta { body: 1, oak: 1, alcohol: 1, ..AxisDelta::ZERO },
        tags: &["ripe", "opulent"],
    },
    Rule {
        name: "rioja",
        keywords: &["rioja", "ribera del duero"],
        delta: AxisDelta { body: 1, oak: 1, ..AxisDelta::ZERO },
        tags: &["oak-aged"],
    },
    Rule {
        name: "rhone",
        keywords: &["rhône", "rhone", "châteauneuf", "chateauneuf", "hermitage"],
        delta: AxisDelta { body: 1, tannin: 1, alcohol: 1, ..AxisDelta::ZERO },
        tags: &["spicy"],
    },
    Rule {
        name: "barossa",
        keywords: &["barossa", "mclaren vale"],
        delta: AxisDelta { body: 1, oak: 1, alcohol: 1, ..AxisDelta::ZERO },
        tags: &["ripe"],
    },
    Rule {
        name: "burgundy",
        keywords: &["burgundy", "bourgogne", "côte de nuits", "côte de beaune"],
        delta: AxisDelta { oak: 1, ..AxisDelta::ZERO },
        tags: &["elegant"],
    },
];

const GRAPE_RULES: &[Rule] = &[
    Rule {
        name: "bold",
        keywords: &[
            "cabernet sauvignon",
            "syrah",
            "shiraz",
            "nebbiolo",
            "malbec",
            "tannat",
            "petite sirah",
            "mourvèdre",
            "mourvedre",
        ],
        delta: AxisDelta { body: 1, tannin: 1, alcohol: 1, ..AxisDelta::ZERO },
        tags: &["bold"],
    },
    Rule {
        name: "delicate",
        keywords: &["pinot noir", "gamay", "riesling", "sauvignon blanc", "albariño", "albarino"],
        delta: AxisDelta { body: -1, tannin: -1, acidity: 1, ..AxisDelta::ZERO },
        tags: &["fresh"],
    },
    Rule {
        name: "aromatic",
        keywords: &["gewürztraminer", "gewurztraminer", "moscato", "muscat"],
        delta: AxisDelta { sweetness: 1, ..AxisDelta::ZERO },
        tags: &["aromatic"],
    },
];

const STYLE_RULES: &[Rule] = &[
    Rule {
        name: "reserve",
        keywords: &[
            "reserve",
            "reserva",
            "riserva",
            "grand cru",
            "premier cru",
            "1er cru",
            "grand vin",
            "barrel",
        ],
        delta: AxisDelta { body: 1, oak: 1, ..AxisDelta::ZERO },
        tags: &["reserve"],
    },
    Rule {
        name: "sweet",
        keywords: &["late harvest", "dessert", "sweet", "doux", "auslese", "passito"],
        delta: AxisDelta { sweetness: 2, ..AxisDelta::ZERO },
        tags: &["sweet"],
    },
    Rule {
        name: "dry",
        keywords: &["brut", "zero dosage", "pas dosé"],
        delta: AxisDelta { sweetness: -1, ..AxisDelta::ZERO },
        tags: &["dry"],
    },
];

// ============================================================================
// Estimation
// ============================================================================

/// Working axis values; signed so negative deltas clamp cleanly
#[derive(Debug, Clone, Copy)]
struct Axes {
    body: i32,
    tannin: i32,
    acidity: i32,
    oak: i32,
    sweetness: i32,
    alcohol: i32,
}

impl Axes {
    fn base(wine_type: Option<WineType>) -> Self {
        match wine_type {
            Some(WineType::White) => Axes {
                body: 2,
                tannin: 1,
                acidity: 4,
                oak: 2,
                sweetness: 1,
                alcohol: 3,
            },
            Some(WineType::Rose) => Axes {
                body: 2,
                tannin: 1,
                acidity: 4,
                oak: 1,
                sweetness: 1,
                alcohol: 3,
            },
            Some(WineType::Sparkling) => Axes {
                body: 2,
                tannin: 1,
                acidity: 5,
                oak: 1,
                sweetness: 2,
                alcohol: 2,
            },
            // Red, and unknown types, start from the middle of the scale
            Some(WineType::Red) | None => Axes {
                body: 3,
                tannin: 3,
                acidity: 3,
                oak: 2,
                sweetness: 0,
                alcohol: 3,
            },
        }
    }

    fn apply(&mut self, delta: &AxisDelta) {
        let min = StructuralProfile::AXIS_MIN as i32;
        let max = StructuralProfile::AXIS_MAX as i32;
        let sweet_min = StructuralProfile::SWEETNESS_MIN as i32;

        self.body = (self.body + delta.body).clamp(min, max);
        self.tannin = (self.tannin + delta.tannin).clamp(min, max);
        self.acidity = (self.acidity + delta.acidity).clamp(min, max);
        self.oak = (self.oak + delta.oak).clamp(min, max);
        self.sweetness = (self.sweetness + delta.sweetness).clamp(sweet_min, max);
        self.alcohol = (self.alcohol + delta.alcohol).clamp(min, max);
    }
}

/// Compute the 1-10 power score from axis values
///
/// Weighted sum normalized against the maximum possible weighted sum, scaled
/// to 10, rounded and clamped to [1, 10].
pub fn compute_power(body: u8, tannin: u8, acidity: u8, oak: u8, sweetness: u8) -> u8 {
    let weighted = body as f64 * BODY_WEIGHT
        + tannin as f64 * TANNIN_WEIGHT
        + oak as f64 * OAK_WEIGHT
        + acidity as f64 * ACIDITY_WEIGHT
        + sweetness as f64 * SWEETNESS_WEIGHT;
    let max = StructuralProfile::AXIS_MAX as f64
        * (BODY_WEIGHT + TANNIN_WEIGHT + OAK_WEIGHT + ACIDITY_WEIGHT + SWEETNESS_WEIGHT);

    let power = (weighted / max * 10.0).round() as i64;
    power.clamp(
        StructuralProfile::POWER_MIN as i64,
        StructuralProfile::POWER_MAX as i64,
    ) as u8
}

/// Estimate a heuristic profile stamped with the current time
pub fn estimate_profile(metadata: &ProfileMetadata) -> StructuralProfile {
    estimate_profile_at(metadata, time::now())
}

/// Estimate a heuristic profile stamped with `generated_at`
pub fn estimate_profile_at(
    metadata: &ProfileMetadata,
    generated_at: DateTime<Utc>,
) -> StructuralProfile {
    let mut axes = Axes::base(metadata.wine_type);
    let mut tags: Vec<String> = Vec::new();
    let mut fired: Vec<&'static str> = Vec::new();

    if let Some(region) = non_empty(metadata.region.as_deref()) {
        let region = region.to_lowercase();
        apply_rules(REGION_RULES, |kw| region.contains(kw), &mut axes, &mut tags, &mut fired);
    }

    let grapes: Vec<String> = metadata
        .grapes
        .iter()
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect();
    if !grapes.is_empty() {
        apply_rules(
            GRAPE_RULES,
            |kw| grapes.iter().any(|g| g.contains(kw)),
            &mut axes,
            &mut tags,
            &mut fired,
        );
    }

    if let Some(style) = non_empty(metadata.style.as_deref()) {
        let style = style.to_lowercase();
        apply_rules(STYLE_RULES, |kw| style.contains(kw), &mut axes, &mut tags, &mut fired);
    }

    let body = axes.body as u8;
    let tannin = axes.tannin as u8;
    let acidity = axes.acidity as u8;
    let oak = axes.oak as u8;
    let sweetness = axes.sweetness as u8;

    complete_tags(&mut tags, &axes);

    let power = compute_power(body, tannin, acidity, oak, sweetness);

    debug!(
        rules = ?fired,
        body,
        tannin,
        acidity,
        oak,
        sweetness,
        power,
        "Heuristic profile estimated"
    );

    StructuralProfile {
        body,
        tannin,
        acidity,
        oak,
        sweetness,
        alcohol: axes.alcohol as u8,
        power,
        style_tags: tags,
        confidence: ProfileConfidence::Low,
        source: ProfileSource::Heuristic,
        generated_at,
    }
}

/// Return the cached profile if still fresh, otherwise a heuristic estimate
pub fn select_profile(
    cached: Option<&StructuralProfile>,
    metadata: &ProfileMetadata,
    now: DateTime<Utc>,
    max_age: Duration,
) -> StructuralProfile {
    match cached {
        Some(profile) if !profile.is_stale(now, max_age) => profile.clone(),
        Some(profile) => {
            debug!(
                generated_at = %profile.generated_at,
                "Cached profile is stale, regenerating heuristically"
            );
            estimate_profile_at(metadata, now)
        }
        None => estimate_profile_at(metadata, now),
    }
}

fn apply_rules<F>(
    rules: &'static [Rule],
    matches: F,
    axes: &mut Axes,
    tags: &mut Vec<String>,
    fired: &mut Vec<&'static str>,
) where
    F: Fn(&str) -> bool,
{
    for rule in rules {
        if rule.keywords.iter().any(|&kw| matches(kw)) {
            axes.apply(&rule.delta);
            for tag in rule.tags {
                push_tag(tags, tag);
            }
            fired.push(rule.name);
        }
    }
}

fn complete_tags(tags: &mut Vec<String>, axes: &Axes) {
    if tags.len() < MIN_STYLE_TAGS {
        if axes.body >= TAG_THRESHOLD {
            push_tag(tags, "full-bodied");
        }
        if axes.tannin >= TAG_THRESHOLD {
            push_tag(tags, "firm tannins");
        }
        if axes.acidity >= TAG_THRESHOLD {
            push_tag(tags, "crisp");
        }
    }

    for filler in FILLER_TAGS {
        if tags.len() >= MIN_STYLE_TAGS {
            break;
        }
        push_tag(tags, filler);
    }
}

fn push_tag(tags: &mut Vec<String>, tag: &str) {
    if !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
