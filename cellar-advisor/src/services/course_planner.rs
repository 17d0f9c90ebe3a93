//! Multi-course planner
//!
//! Assigns one bottle per course, in course order, by greedily taking the
//! unused bottle with the best pairing score. Bottles are reused only once
//! every bottle has been poured. Ties go to the lighter bottle (lower power)
//! so the sequence builds in weight.

use crate::services::food_pairing::{pairing_explanation, pairing_score, CoursePosition, FoodProfile};
use cellar_common::models::StructuralProfile;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    #[serde(default)]
    pub food: FoodProfile,
}

/// A bottle available for the meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingBottle {
    pub bottle_id: String,
    pub name: String,
    pub profile: StructuralProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseAssignment {
    pub course: String,
    pub position: CoursePosition,
    pub bottle_id: String,
    pub bottle_name: String,
    pub score: i32,
    pub explanation: String,
}

/// Plan a bottle for each course; empty when there are no bottles
///
/// Bottles sharing an id count once (the first listed wins).
pub fn plan_courses(courses: &[Course], bottles: &[PairingBottle]) -> Vec<CourseAssignment> {
    let mut seen: HashSet<&str> = HashSet::new();
    let bottles: Vec<&PairingBottle> = bottles
        .iter()
        .filter(|b| seen.insert(b.bottle_id.as_str()))
        .collect();
    if bottles.is_empty() {
        return Vec::new();
    }

    let mut used: HashSet<&str> = HashSet::new();
    let mut plan = Vec::with_capacity(courses.len());

    for (index, course) in courses.iter().enumerate() {
        if used.len() == bottles.len() {
            used.clear();
        }

        let best = bottles
            .iter()
            .copied()
            .filter(|b| !used.contains(b.bottle_id.as_str()))
            .map(|b| (pairing_score(&b.profile, &course.food), b))
            .max_by(|(sa, a), (sb, b)| compare_choice(*sa, a, *sb, b));

        let Some((score, bottle)) = best else {
            continue;
        };
        used.insert(bottle.bottle_id.as_str());

        let position = CoursePosition::of(index, courses.len());
        debug!(
            course = %course.name,
            bottle = %bottle.bottle_id,
            score,
            "Course paired"
        );

        plan.push(CourseAssignment {
            course: course.name.clone(),
            position,
            bottle_id: bottle.bottle_id.clone(),
            bottle_name: bottle.name.clone(),
            score,
            explanation: pairing_explanation(&bottle.profile, &course.food, Some(position)),
        });
    }

    plan
}

/// Ordering where the greater element is the preferred pick
fn compare_choice(sa: i32, a: &PairingBottle, sb: i32, b: &PairingBottle) -> Ordering {
    sa.cmp(&sb)
        .then_with(|| b.profile.power.cmp(&a.profile.power))
        .then_with(|| b.bottle_id.cmp(&a.bottle_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::food_pairing::{Level, Protein, Sauce};
    use cellar_common::models::{ProfileConfidence, ProfileSource};
    use chrono::Utc;

    fn bottle(id: &str, body: u8, tannin: u8, acidity: u8, oak: u8, power: u8) -> PairingBottle {
        PairingBottle {
            bottle_id: id.to_string(),
            name: id.to_string(),
            profile: StructuralProfile {
                body,
                tannin,
                acidity,
                oak,
                sweetness: 0,
                alcohol: 3,
                power,
                style_tags: vec![],
                confidence: ProfileConfidence::Low,
                source: ProfileSource::Heuristic,
                generated_at: Utc::now(),
            },
        }
    }

    fn course(name: &str, food: FoodProfile) -> Course {
        Course {
            name: name.to_string(),
            food,
        }
    }

    #[test]
    fn test_each_course_gets_best_unused_bottle() {
        let courses = vec![
            course(
                "oysters",
                FoodProfile {
                    protein: Protein::Shellfish,
                    ..Default::default()
                },
            ),
            course(
                "ribeye",
                FoodProfile {
                    protein: Protein::RedMeat,
                    fat: Level::High,
                    ..Default::default()
                },
            ),
        ];
        let bottles = vec![bottle("cabernet", 5, 5, 3, 4, 9), bottle("muscadet", 2, 1, 5, 1, 3)];

        let plan = plan_courses(&courses, &bottles);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].bottle_id, "muscadet");
        assert_eq!(plan[0].position, CoursePosition::First);
        assert_eq!(plan[1].bottle_id, "cabernet");
        assert_eq!(plan[1].position, CoursePosition::Last);
    }

    #[test]
    fn test_bottles_reused_only_when_exhausted() {
        let food = FoodProfile {
            sauce: Sauce::Tomato,
            ..Default::default()
        };
        let courses = vec![course("a", food), course("b", food), course("c", food)];
        let bottles = vec![bottle("x", 3, 3, 5, 2, 5), bottle("y", 3, 3, 2, 2, 5)];

        let plan = plan_courses(&courses, &bottles);

        let ids: Vec<&str> = plan.iter().map(|a| a.bottle_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "x"]);
    }

    #[test]
    fn test_ties_prefer_lighter_bottle() {
        let courses = vec![course("bread", FoodProfile::default()), course("more bread", FoodProfile::default())];
        let bottles = vec![bottle("heavy", 4, 4, 3, 3, 8), bottle("light", 2, 2, 3, 1, 3)];

        let plan = plan_courses(&courses, &bottles);
        assert_eq!(plan[0].bottle_id, "light");
        assert_eq!(plan[1].bottle_id, "heavy");
    }

    #[test]
    fn test_no_bottles_yields_empty_plan() {
        let courses = vec![course("soup", FoodProfile::default())];
        assert!(plan_courses(&courses, &[]).is_empty());
    }

    #[test]
    fn test_middle_course_explained_by_rule() {
        let courses = vec![
            course("starter", FoodProfile::default()),
            course(
                "pasta",
                FoodProfile {
                    sauce: Sauce::Tomato,
                    ..Default::default()
                },
            ),
            course("dessert", FoodProfile::default()),
        ];
        let bottles = vec![
            bottle("a", 2, 1, 3, 1, 3),
            bottle("b", 3, 2, 5, 1, 5),
            bottle("c", 4, 4, 3, 3, 8),
        ];
        let plan = plan_courses(&courses, &bottles);
        assert_eq!(plan[1].position, CoursePosition::Middle);
        assert_eq!(plan[1].bottle_id, "b");
        assert!(plan[1].explanation.contains("tomato"));
    }

    #[test]
    fn test_duplicate_bottle_ids_do_not_drop_courses() {
        let food = FoodProfile::default();
        let courses = vec![course("a", food), course("b", food), course("c", food)];
        let bottles = vec![
            bottle("x", 3, 3, 3, 2, 5),
            bottle("x", 3, 3, 3, 2, 5),
            bottle("y", 2, 2, 3, 1, 3),
        ];

        let plan = plan_courses(&courses, &bottles);

        let ids: Vec<&str> = plan.iter().map(|a| a.bottle_id.as_str()).collect();
        assert_eq!(ids, vec!["y", "x", "y"]);
    }
}
