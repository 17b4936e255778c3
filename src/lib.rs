//! Static site generator for talks and speaking engagements.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
