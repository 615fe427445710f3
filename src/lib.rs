//! `movie-rank` library crate.
//!
//! The binary (`mrank`) is a thin wrapper around this library so that:
//!
//! - scoring and blending are testable without spawning processes
//! - the engine can be embedded behind other front ends

pub mod app;
pub mod blend;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod scoring;
pub mod text;
