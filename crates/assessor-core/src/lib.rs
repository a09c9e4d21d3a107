//! assessor-core: Scoring engine, data model, and result contract.
//!
//! This crate defines the phase table, the validation → scoring →
//! aggregation → feedback pipeline, the result record consumers read, and
//! the store and recommender traits the rest of assessor builds on.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod scorer;
pub mod traits;
pub mod validator;
