//! Command implementations for artifactctl CLI

pub mod export;

pub use export::{run_export, run_extract, run_orgs};
