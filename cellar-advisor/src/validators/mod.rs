//! Validation layer
//!
//! Validators inspect classifier output; they report problems as data and
//! never modify what they are given.
//!
//! # Validators
//! 1. **vintage_consistency** - readiness ordering across a wine family

pub mod vintage_consistency;

pub use vintage_consistency::{
    validate_family, ClassifiedBottle, VintageConsistencyValidator, VintageIssue,
    VintageValidation,
};
