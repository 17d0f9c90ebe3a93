//! Inventory bottle records
//!
//! The shape of one entry in an exported inventory file. Storage and import of
//! inventories live outside this workspace; the advisor only reads them.

use super::{StructuralProfile, Wine, WineType};
use serde::{Deserialize, Serialize};

/// One stocked wine with quantity and price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryBottle {
    /// Bottle id; generated on load when absent
    #[serde(default)]
    pub id: Option<String>,
    pub producer: String,
    pub name: String,
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
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub profile: Option<StructuralProfile>,
}

fn default_quantity() -> u32 {
    1
}

impl InventoryBottle {
    /// Build the wine view of this bottle
    ///
    /// The wine id doubles as the profile cache key, so it is derived from the
    /// identity and vintage rather than the bottle id.
    pub fn to_wine(&self) -> Wine {
        let identity = Wine {
            producer: self.producer.clone(),
            name: self.name.clone(),
            ..Default::default()
        }
        .identity();
        let vintage = self
            .vintage
            .map(|v| v.to_string())
            .unwrap_or_else(|| "nv".to_string());

        Wine {
            id: format!("{}|{}|{}", identity.producer, identity.name, vintage),
            producer: self.producer.clone(),
            name: self.name.clone(),
            vintage: self.vintage,
            wine_type: self.wine_type,
            region: self.region.clone(),
            country: self.country.clone(),
            grapes: self.grapes.clone(),
            style: self.style.clone(),
            profile: self.profile.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_defaults_to_one() {
        let json = r#"{"producer":"Ridge","name":"Monte Bello","vintage":2016,"type":"red"}"#;
        let bottle: InventoryBottle = serde_json::from_str(json).unwrap();
        assert_eq!(bottle.quantity, 1);
        assert_eq!(bottle.wine_type, Some(WineType::Red));
        assert!(bottle.id.is_none());
    }

    #[test]
    fn test_wine_id_is_identity_and_vintage() {
        let bottle = InventoryBottle {
            producer: "Ridge".to_string(),
            name: "Monte Bello".to_string(),
            vintage: Some(2016),
            ..Default::default()
        };
        assert_eq!(bottle.to_wine().id, "ridge|monte bello|2016");

        let nv = InventoryBottle {
            producer: "Krug".to_string(),
            name: "Grande Cuvée".to_string(),
            ..Default::default()
        };
        assert_eq!(nv.to_wine().id, "krug|grande cuvée|nv");
    }
}
