//! Vintage Consistency Validator
//!
//! Checks that readiness verdicts within a wine family respect vintage order:
//! an older vintage must never be judged less ready than a younger one.
//!
//! # Algorithm
//! 1. Group bottles by wine identity (case-insensitive producer + name)
//! 2. Drop bottles without a vintage; collapse the rest to one slot per
//!    distinct vintage, keeping its least and most ready verdicts
//! 3. Skip groups with fewer than 2 vintages, walk adjacent vintages in
//!    ascending order
//! 4. Flag a pair when the older vintage has a HOLD bottle and the younger
//!    vintage has a READY or PEAK_SOON bottle
//!
//! Detection only: issues are returned to the caller, verdicts are left as
//! they are.
//!
//! # Example
//! ```rust,ignore
//! use cellar_advisor::validators::validate_family;
//!
//! let report = validate_family(&bottles);
//! if !report.valid {
//!     for issue in &report.issues {
//!         println!("{}: {}", issue.older_vintage, issue.issue);
//!     }
//! }
//! ```

use cellar_common::models::{ReadinessLabel, ReadinessVerdict, WineIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A bottle together with its previously computed verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedBottle {
    #[serde(default)]
    pub bottle_id: Option<String>,
    pub producer: String,
    pub name: String,
    pub vintage: Option<i32>,
    pub verdict: ReadinessVerdict,
}

impl ClassifiedBottle {
    pub fn identity(&self) -> WineIdentity {
        WineIdentity::new(&self.producer, &self.name)
    }
}

/// One ordering violation between adjacent vintages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VintageIssue {
    pub producer: String,
    pub name: String,
    pub older_vintage: i32,
    pub younger_vintage: i32,
    pub issue: String,
    pub suggestion: String,
}

/// Validation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VintageValidation {
    pub valid: bool,
    pub issues: Vec<VintageIssue>,
}

/// Bottles of one vintage, reduced to their extreme verdicts
#[derive(Debug, Clone, Copy)]
struct VintageSlot<'a> {
    least_ready: &'a ClassifiedBottle,
    most_ready: &'a ClassifiedBottle,
}

impl<'a> VintageSlot<'a> {
    fn new(bottle: &'a ClassifiedBottle) -> Self {
        Self {
            least_ready: bottle,
            most_ready: bottle,
        }
    }

    fn add(&mut self, bottle: &'a ClassifiedBottle) {
        let rank = bottle.verdict.label.rank();
        if rank < self.least_ready.verdict.label.rank() {
            self.least_ready = bottle;
        }
        if rank > self.most_ready.verdict.label.rank() {
            self.most_ready = bottle;
        }
    }
}

/// Vintage Consistency Validator
#[derive(Debug, Default, Clone, Copy)]
pub struct VintageConsistencyValidator;

impl VintageConsistencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate every wine family present in `bottles`
    pub fn validate(&self, bottles: &[ClassifiedBottle]) -> VintageValidation {
        let mut families: BTreeMap<WineIdentity, BTreeMap<i32, VintageSlot>> = BTreeMap::new();
        for bottle in bottles {
            if let Some(vintage) = bottle.vintage {
                families
                    .entry(bottle.identity())
                    .or_default()
                    .entry(vintage)
                    .and_modify(|slot| slot.add(bottle))
                    .or_insert_with(|| VintageSlot::new(bottle));
            }
        }

        let mut issues = Vec::new();
        for (identity, vintages) in families {
            if vintages.len() < 2 {
                continue;
            }

            let slots: Vec<(i32, VintageSlot)> = vintages.into_iter().collect();
            for pair in slots.windows(2) {
                let (older_vintage, older) = &pair[0];
                let (younger_vintage, younger) = &pair[1];
                if let Some(issue) = self.check_pair(
                    *older_vintage,
                    older.least_ready,
                    *younger_vintage,
                    younger.most_ready,
                ) {
                    debug!(
                        wine = %identity,
                        older_vintage = *older_vintage,
                        younger_vintage = *younger_vintage,
                        "Vintage inversion detected"
                    );
                    issues.push(issue);
                }
            }
        }

        VintageValidation {
            valid: issues.is_empty(),
            issues,
        }
    }

    fn check_pair(
        &self,
        older_vintage: i32,
        older: &ClassifiedBottle,
        younger_vintage: i32,
        younger: &ClassifiedBottle,
    ) -> Option<VintageIssue> {
        let older_label = older.verdict.label;
        let younger_label = younger.verdict.label;

        if older_label != ReadinessLabel::Hold || younger_label.rank() <= older_label.rank() {
            return None;
        }

        Some(VintageIssue {
            producer: older.producer.clone(),
            name: older.name.clone(),
            older_vintage,
            younger_vintage,
            issue: format!(
                "{} {} is marked {} while the younger {} is marked {}",
                older.name, older_vintage, older_label, younger_vintage, younger_label
            ),
            suggestion: format!(
                "Review the {} verdict: an older vintage is normally at least as ready as {}",
                older_vintage, younger_vintage
            ),
        })
    }
}

/// Validate wine families with the default validator
pub fn validate_family(bottles: &[ClassifiedBottle]) -> VintageValidation {
    VintageConsistencyValidator::new().validate(bottles)
}
