//! Cellar data model
//!
//! Types shared between the advisor engine, the persistence layer and the CLI.

mod inventory;
mod profile;
mod readiness;
mod wine;

pub use inventory::InventoryBottle;
pub use profile::{ProfileConfidence, ProfileSource, StructuralProfile};
pub use readiness::{DrinkWindow, ReadinessLabel, ReadinessVerdict, VerdictConfidence};
pub use wine::{Wine, WineIdentity, WineType};
