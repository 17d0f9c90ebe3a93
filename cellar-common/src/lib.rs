//! # Cellar Common Library
//!
//! Shared code for the cellar workspace including:
//! - Wine, structural profile and readiness data model
//! - Inventory records consumed by the advisor
//! - Configuration loading and root folder resolution
//! - SQLite persistence for profile cache, rotation state and consumption history
//! - Timestamp utilities

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use models::{
    DrinkWindow, InventoryBottle, ProfileConfidence, ProfileSource, ReadinessLabel,
    ReadinessVerdict, StructuralProfile, VerdictConfidence, Wine, WineIdentity, WineType,
};
