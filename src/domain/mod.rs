//! Domain layer types and invariants.

pub mod engagements;
pub mod error;
