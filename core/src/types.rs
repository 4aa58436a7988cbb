//! Shared primitive types used across the crate.

/// Identifier assigned by the store when a scenario is persisted.
pub type ScenarioId = i64;

/// Currency amounts. Stored and computed as plain f64.
pub type Money = f64;
