//! Readiness verdict types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Readiness label
///
/// Ordering for vintage consistency: HOLD < READY ≈ PEAK_SOON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessLabel {
    /// Too young, keep cellaring
    Hold,
    /// Inside its drinking window
    Ready,
    /// Approaching its optimal window
    PeakSoon,
}

impl ReadinessLabel {
    /// Rank on the HOLD < READY ≈ PEAK_SOON ordering
    pub fn rank(&self) -> u8 {
        match self {
            ReadinessLabel::Hold => 0,
            ReadinessLabel::Ready | ReadinessLabel::PeakSoon => 1,
        }
    }

    /// Drinkable now (READY or PEAK_SOON)
    pub fn is_drinkable(&self) -> bool {
        self.rank() > 0
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLabel::Hold => "HOLD",
            ReadinessLabel::Ready => "READY",
            ReadinessLabel::PeakSoon => "PEAK_SOON",
        }
    }
}

impl fmt::Display for ReadinessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence in a readiness verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictConfidence {
    Low,
    Medium,
    High,
}

/// Inclusive range of calendar years in which to drink a bottle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrinkWindow {
    pub start: i32,
    pub end: i32,
}

impl DrinkWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

/// Outcome of readiness classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessVerdict {
    pub label: ReadinessLabel,
    #[serde(default)]
    pub window: Option<DrinkWindow>,
    pub confidence: VerdictConfidence,
    /// Ordered, human-readable explanation
    pub reasons: Vec<String>,
    #[serde(default)]
    pub assumptions: Option<String>,
    /// Classification logic version; bumped whenever thresholds change
    pub version: u32,
    pub computed_at: DateTime<Utc>,
}

impl ReadinessVerdict {
    /// Current year lies inside the verdict's drink window
    pub fn in_window(&self, year: i32) -> bool {
        self.window.map(|w| w.contains(year)).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rank_ordering() {
        assert!(ReadinessLabel::Hold.rank() < ReadinessLabel::Ready.rank());
        assert_eq!(ReadinessLabel::Ready.rank(), ReadinessLabel::PeakSoon.rank());
        assert!(!ReadinessLabel::Hold.is_drinkable());
        assert!(ReadinessLabel::PeakSoon.is_drinkable());
    }

    #[test]
    fn test_label_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&ReadinessLabel::PeakSoon).unwrap(),
            "\"PEAK_SOON\""
        );
        assert_eq!(ReadinessLabel::PeakSoon.to_string(), "PEAK_SOON");
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let window = DrinkWindow::new(2024, 2027);
        assert!(window.contains(2024));
        assert!(window.contains(2027));
        assert!(!window.contains(2028));
    }
}
