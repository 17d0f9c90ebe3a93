//! Stores for the engine's external collaborators
//!
//! Each collaborator is an async trait with an in-memory implementation (tests,
//! one-shot CLI runs) and a SQLite implementation backed by `cellar_common::db`.

pub mod consumption;
pub mod profile_cache;
pub mod rotation;

pub use consumption::{ConsumptionHistory, InMemoryConsumptionHistory, SqliteConsumptionHistory};
pub use profile_cache::{InMemoryProfileCache, ProfileCache, SqliteProfileCache};
pub use rotation::{InMemoryRotationStore, RotationStore, SqliteRotationStore};
