//! Food-Pairing Scorer
//!
//! Scores how well a wine's structural profile suits a dish. Each food
//! attribute contributes through independent additive rules; the total is a
//! signed integer (positive = good match).

use cellar_common::models::StructuralProfile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protein {
    #[default]
    None,
    RedMeat,
    Pork,
    Poultry,
    Fish,
    Shellfish,
    Vegetable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sauce {
    #[default]
    None,
    Tomato,
    Cream,
    Citrus,
    Sweet,
}

/// What a dish brings to the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoodProfile {
    #[serde(default)]
    pub protein: Protein,
    #[serde(default)]
    pub fat: Level,
    #[serde(default)]
    pub sauce: Sauce,
    #[serde(default)]
    pub spice: Level,
    #[serde(default)]
    pub smoke: Level,
}

/// Place of a course within a multi-course meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoursePosition {
    First,
    Middle,
    Last,
}

impl CoursePosition {
    /// Position of course `index` in a meal of `count` courses
    pub fn of(index: usize, count: usize) -> Self {
        if index == 0 {
            CoursePosition::First
        } else if index + 1 >= count {
            CoursePosition::Last
        } else {
            CoursePosition::Middle
        }
    }
}

/// A rule's contribution and the phrase describing it
struct RuleHit {
    points: i32,
    phrase: &'static str,
}

type PairingRule = fn(&StructuralProfile, &FoodProfile) -> Option<RuleHit>;

fn hit(points: i32, phrase: &'static str) -> Option<RuleHit> {
    Some(RuleHit { points, phrase })
}

const RULES: &[PairingRule] = &[
    rich_red_meat,
    lean_meat,
    seafood,
    poultry_or_pork,
    fat_and_acidity,
    tomato_sauce,
    cream_sauce,
    citrus_sauce,
    sweet_sauce,
    spice,
    smoke,
];

fn rich_red_meat(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.protein != Protein::RedMeat || f.fat != Level::High {
        return None;
    }
    let mut points = 0;
    if w.body >= 4 {
        points += 3;
    }
    if w.tannin >= 4 {
        points += 3;
    }
    if w.body <= 2 {
        points -= 3;
    }
    hit(points, "Firm tannins and full body stand up to rich red meat")
}

fn lean_meat(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.protein != Protein::RedMeat || f.fat == Level::High {
        return None;
    }
    let points = if w.tannin >= 3 { 2 } else { 0 };
    hit(points, "Structured enough for red meat")
}

fn seafood(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if !matches!(f.protein, Protein::Fish | Protein::Shellfish) {
        return None;
    }
    let mut points = 0;
    if w.body <= 2 {
        points += 2;
    }
    if w.acidity >= 4 {
        points += 2;
    }
    if w.tannin >= 3 {
        points -= 3;
    }
    hit(points, "Light and crisp, letting the seafood shine")
}

fn poultry_or_pork(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if !matches!(f.protein, Protein::Poultry | Protein::Pork) {
        return None;
    }
    let mut points = 0;
    if (2..=3).contains(&w.body) {
        points += 1;
    }
    if w.acidity >= 3 {
        points += 1;
    }
    hit(points, "Medium weight to match white meat")
}

fn fat_and_acidity(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.fat != Level::High || w.acidity < 4 {
        return None;
    }
    hit(2, "Bright acidity cuts through the richness")
}

fn tomato_sauce(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.sauce != Sauce::Tomato {
        return None;
    }
    let points = if w.acidity >= 4 {
        3
    } else if w.acidity <= 2 {
        -3
    } else {
        0
    };
    hit(points, "Acidity to match the tomato")
}

fn cream_sauce(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.sauce != Sauce::Cream {
        return None;
    }
    let mut points = 0;
    if w.body >= 3 {
        points += 2;
    }
    if w.oak >= 3 {
        points += 1;
    }
    if w.tannin >= 4 {
        points -= 2;
    }
    hit(points, "Rounded texture mirrors the creamy sauce")
}

fn citrus_sauce(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.sauce != Sauce::Citrus {
        return None;
    }
    let points = if w.acidity >= 4 { 2 } else { 0 };
    hit(points, "Zesty acidity echoes the citrus")
}

fn sweet_sauce(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    if f.sauce != Sauce::Sweet {
        return None;
    }
    let points = if w.sweetness >= 2 {
        2
    } else if w.sweetness == 0 {
        -1
    } else {
        0
    };
    hit(points, "A touch of sweetness meets the glaze")
}

fn spice(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    match f.spice {
        Level::High => {
            let mut points = 0;
            if w.sweetness >= 2 {
                points += 3;
            }
            if w.tannin >= 4 && w.alcohol >= 4 {
                points -= 4;
            }
            hit(points, "Residual sweetness tames the heat")
        }
        Level::Medium => {
            let points = if w.sweetness >= 1 { 1 } else { 0 };
            hit(points, "A softer style for gentle spice")
        }
        _ => None,
    }
}

fn smoke(w: &StructuralProfile, f: &FoodProfile) -> Option<RuleHit> {
    match f.smoke {
        Level::High => {
            let points = if w.oak >= 3 { 3 } else { 0 };
            hit(points, "Oak-driven toast meets the smoke and char")
        }
        Level::Medium | Level::Low => {
            let points = if w.oak >= 2 { 1 } else { 0 };
            hit(points, "A hint of oak for the smoky notes")
        }
        Level::None => None,
    }
}

/// Signed pairing score; higher is a better match
pub fn pairing_score(profile: &StructuralProfile, food: &FoodProfile) -> i32 {
    RULES
        .iter()
        .filter_map(|rule| rule(profile, food))
        .map(|h| h.points)
        .sum()
}

/// One short phrase explaining the match for a course
///
/// Opening and closing courses get a positional phrase; otherwise the
/// strongest rewarding rule is described, falling back to the wine's
/// dominant trait.
pub fn pairing_explanation(
    profile: &StructuralProfile,
    food: &FoodProfile,
    position: Option<CoursePosition>,
) -> String {
    match position {
        Some(CoursePosition::First) => {
            return "A fresh opener to wake up the palate".to_string();
        }
        Some(CoursePosition::Last) => {
            return "A satisfying finish to close the meal".to_string();
        }
        _ => {}
    }

    let strongest = RULES
        .iter()
        .filter_map(|rule| rule(profile, food))
        .filter(|h| h.points > 0)
        .fold(None::<RuleHit>, |best, h| match best {
            Some(b) if b.points >= h.points => Some(b),
            _ => Some(h),
        });

    if let Some(h) = strongest {
        return h.phrase.to_string();
    }

    if profile.power >= 7 {
        "A powerful wine with plenty of presence".to_string()
    } else if profile.acidity >= 4 {
        "Lively acidity keeps each bite fresh".to_string()
    } else if profile.oak >= 3 {
        "Gentle oak adds warmth to the dish".to_string()
    } else {
        "A versatile, easy-going match".to_string()
    }
}
