//! Command-line parsing for the movie ranking engine.
//!
//! Argument parsing and command dispatch are kept apart from the scoring code.
//! Flags left unset fall through to the config file and then to built-in
//! defaults (see `app::rank_config_from_args`).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mrank", version, about = "Blend per-domain movie scores into one ranking")]
pub struct Cli {
    /// Log at debug level (overrides `RUST_LOG`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a catalog in every domain, blend, and write all tables plus the run log.
    Score(ScoreArgs),
    /// Blend previously written component tables.
    Blend(BlendArgs),
    /// Score and blend a catalog, printing only the leaderboard.
    Rank(RankArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ScoreArgs {
    /// Catalog CSV (`item_id`/`id`, `title`, and any domain columns).
    #[arg(long, value_name = "CSV")]
    pub catalog: PathBuf,

    /// Output directory for tables, diagnostics, and `run_log.txt`.
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub out: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BlendArgs {
    /// Directory holding `01_content_scores.csv` … `04_time_scores.csv`.
    #[arg(long, value_name = "DIR")]
    pub tables: PathBuf,

    /// Output directory for the final tables and `run_log.txt`.
    #[arg(long, value_name = "DIR", default_value = "output")]
    pub out: PathBuf,

    /// Skip absent component tables instead of failing; they contribute 0.
    #[arg(long)]
    pub allow_missing_domains: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args, Clone)]
pub struct RankArgs {
    #[arg(long, value_name = "CSV")]
    pub catalog: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every command.
#[derive(Debug, Args, Clone, Default)]
pub struct CommonArgs {
    /// JSON config file; every field optional.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Leaderboard size [default: 20].
    #[arg(long, env = "MRANK_TOP_N")]
    pub top: Option<usize>,

    /// Target language code for the language-match signal [default: en].
    #[arg(long, env = "MRANK_TARGET_LANG")]
    pub lang: Option<String>,

    /// Reference date for recency, `YYYY-MM-DD` [default: today].
    #[arg(long, env = "MRANK_AS_OF", value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Blend weight for the content domain.
    #[arg(long)]
    pub w_content: Option<f64>,

    /// Blend weight for the rating domain.
    #[arg(long)]
    pub w_rating: Option<f64>,

    /// Blend weight for the business domain.
    #[arg(long)]
    pub w_business: Option<f64>,

    /// Blend weight for the time domain.
    #[arg(long)]
    pub w_time: Option<f64>,

    /// Lower winsorization quantile [default: 0.01].
    #[arg(long)]
    pub winsor_low: Option<f64>,

    /// Upper winsorization quantile [default: 0.99].
    #[arg(long)]
    pub winsor_high: Option<f64>,

    /// Ideal runtime in minutes [default: 110].
    #[arg(long)]
    pub ideal_runtime: Option<f64>,

    /// Runtime deviation (minutes) at which the fit reaches 0 [default: 120].
    #[arg(long)]
    pub max_runtime_dev: Option<f64>,
}
