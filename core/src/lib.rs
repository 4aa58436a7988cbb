//! Invoice automation ROI engine.
//!
//! `calculator` turns business-cost assumptions into savings metrics.
//! `scenario` merges validated inputs with computed outputs, `store`
//! persists them in SQLite and `repository` is the entry point the
//! runner (or any other front end) talks to.

pub mod calculator;
pub mod config;
pub mod error;
pub mod report;
pub mod repository;
pub mod scenario;
pub mod store;
pub mod types;
