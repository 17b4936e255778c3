//! Infrastructure adapters and runtime bootstrap.

pub mod data;
pub mod error;
pub mod output;
pub mod telemetry;
