//! AutoSplice Core - timeline splice engine and run pipeline
//!
//! This crate contains all business logic with zero host-API dependencies.
//! The host editing application (project / media pool / timeline object
//! model) is reached only through the traits in [`host`], so the engine can
//! be driven by the real scripting bridge or by the in-memory fake used in
//! tests.

pub mod config;
pub mod discovery;
pub mod host;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod runner;
pub mod splice;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
