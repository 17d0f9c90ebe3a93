//! Structural profile of a wine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How much trust to place in a structural profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileConfidence {
    Low,
    Medium,
    High,
}

/// Where a structural profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// Generated by the AI profile service
    Ai,
    /// Imported from an external data source
    External,
    /// Derived locally from metadata rules
    Heuristic,
}

/// Numeric taste/structure profile
///
/// Axes are 1-5 except sweetness (0-5). `power` is a derived 1-10 score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralProfile {
    pub body: u8,
    pub tannin: u8,
    pub acidity: u8,
    pub oak: u8,
    pub sweetness: u8,
    /// Estimated alcohol level (1-5); not part of the power score
    #[serde(default = "default_alcohol")]
    pub alcohol: u8,
    pub power: u8,
    #[serde(default)]
    pub style_tags: Vec<String>,
    pub confidence: ProfileConfidence,
    pub source: ProfileSource,
    pub generated_at: DateTime<Utc>,
}

fn default_alcohol() -> u8 {
    3
}

impl StructuralProfile {
    /// Axis bounds for body, tannin, acidity, oak and alcohol
    pub const AXIS_MIN: u8 = 1;
    pub const AXIS_MAX: u8 = 5;
    /// Sweetness may be zero (bone dry)
    pub const SWEETNESS_MIN: u8 = 0;
    pub const POWER_MIN: u8 = 1;
    pub const POWER_MAX: u8 = 10;

    /// Profile age exceeds `max_age` at `now`
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now.signed_duration_since(self.generated_at) > max_age
    }

    /// All axes within their declared bounds
    pub fn is_within_bounds(&self) -> bool {
        let axis = Self::AXIS_MIN..=Self::AXIS_MAX;
        axis.contains(&self.body)
            && axis.contains(&self.tannin)
            && axis.contains(&self.acidity)
            && axis.contains(&self.oak)
            && axis.contains(&self.alcohol)
            && self.sweetness <= Self::AXIS_MAX
            && (Self::POWER_MIN..=Self::POWER_MAX).contains(&self.power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(generated_at: DateTime<Utc>) -> StructuralProfile {
        StructuralProfile {
            body: 4,
            tannin: 4,
            acidity: 3,
            oak: 3,
            sweetness: 0,
            alcohol: 4,
            power: 7,
            style_tags: vec!["structured".to_string()],
            confidence: ProfileConfidence::Medium,
            source: ProfileSource::Ai,
            generated_at,
        }
    }

    #[test]
    fn test_staleness_boundary() {
        let generated = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let profile = sample(generated);
        let max_age = Duration::days(30);

        assert!(!profile.is_stale(generated + Duration::days(30), max_age));
        assert!(profile.is_stale(generated + Duration::days(31), max_age));
    }

    #[test]
    fn test_bounds_check() {
        let mut profile = sample(Utc::now());
        assert!(profile.is_within_bounds());

        profile.power = 11;
        assert!(!profile.is_within_bounds());
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(ProfileConfidence::Low < ProfileConfidence::Medium);
        assert!(ProfileConfidence::Medium < ProfileConfidence::High);
    }

    #[test]
    fn test_missing_alcohol_defaults_on_deserialize() {
        let json = r#"{"body":3,"tannin":3,"acidity":3,"oak":2,"sweetness":1,"power":5,
            "confidence":"high","source":"external","generated_at":"2024-01-01T00:00:00Z"}"#;
        let profile: StructuralProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.alcohol, 3);
        assert!(profile.style_tags.is_empty());
    }
}
