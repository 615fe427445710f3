//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - catalog rows (`CatalogItem`)
//! - per-domain outputs (`ComponentScore`, `ComponentTable`)
//! - blend inputs/outputs (`BlendWeights`, `FinalScore`)
//! - run configuration (`RankConfig` and its parts)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
