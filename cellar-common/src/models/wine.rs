//! Wine identity and metadata

use super::StructuralProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wine colour / style category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WineType {
    Red,
    White,
    #[serde(alias = "rosé")]
    Rose,
    Sparkling,
}

impl WineType {
    /// Parse a free-text type label ("Red", "rosé", "Champagne", ...)
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "red" => Some(WineType::Red),
            "white" => Some(WineType::White),
            "rose" | "rosé" | "rosado" | "rosato" => Some(WineType::Rose),
            "sparkling" | "champagne" | "cava" | "prosecco" | "cremant" | "crémant" => {
                Some(WineType::Sparkling)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "red",
            WineType::White => "white",
            WineType::Rose => "rosé",
            WineType::Sparkling => "sparkling",
        }
    }
}

impl fmt::Display for WineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a wine across vintages
///
/// Lower-cased, whitespace-trimmed (producer, name) pair. All vintages sharing
/// an identity form a wine family.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WineIdentity {
    pub producer: String,
    pub name: String,
}

impl WineIdentity {
    pub fn new(producer: &str, name: &str) -> Self {
        Self {
            producer: producer.trim().to_lowercase(),
            name: name.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for WineIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.producer, self.name)
    }
}

/// A wine as known to the cellar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wine {
    /// Stable wine id used as the profile cache key
    pub id: String,
    pub producer: String,
    pub name: String,
    /// Vintage year; `None` for non-vintage wines
    #[serde(default)]
    pub vintage: Option<i32>,
    #[serde(default, rename = "type")]
    pub wine_type: Option<WineType>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub grapes: Vec<String>,
    /// Free-text style descriptor ("Gran Reserva", "Brut", ...)
    #[serde(default)]
    pub style: Option<String>,
    /// Cached structural profile, if one has been generated
    #[serde(default)]
    pub profile: Option<StructuralProfile>,
}

impl Wine {
    pub fn identity(&self) -> WineIdentity {
        WineIdentity::new(&self.producer, &self.name)
    }

    /// Human-readable label, e.g. "Château Margaux Grand Vin 2015"
    pub fn display_name(&self) -> String {
        match self.vintage {
            Some(year) => format!("{} {} {}", self.producer, self.name, year),
            None => format!("{} {} NV", self.producer, self.name),
        }
    }
}
