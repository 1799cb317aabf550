//! kudos: relevance-weighted contributor rewards (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod stages;
pub mod telemetry;
