//! Reporting: terminal leaderboard and the run log file.

pub mod format;
pub mod runlog;

pub use format::*;
pub use runlog::*;
