//! Input/output helpers.
//!
//! - catalog CSV ingest + validation (`ingest`)
//! - component tables read back for a standalone blend (`tables`)
//! - score tables, diagnostics, and JSON exports (`export`)

pub mod export;
pub mod ingest;
pub mod tables;

pub use export::*;
pub use ingest::*;
pub use tables::*;
