//! Build pipeline steps and their orchestration.

pub mod build;
pub mod error;
pub mod markup;
pub mod scripts;
pub mod styles;
