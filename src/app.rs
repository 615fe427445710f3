//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the tracing subscriber
//! - layers the run configuration (defaults, config file, env, flags)
//! - runs the scoring/blending pipeline
//! - prints the leaderboard and writes exports

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{BlendArgs, Command, CommonArgs, RankArgs, ScoreArgs};
use crate::domain::{ConfigFile, Domain, RankConfig};
use crate::error::AppError;
use crate::report::StageCounts;

pub mod pipeline;

/// Entry point for the `mrank` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` must be loaded before clap reads `MRANK_*` variables.
    let dotenv = dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);
    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    match cli.command {
        Command::Score(args) => handle_score(args),
        Command::Blend(args) => handle_blend(args),
        Command::Rank(args) => handle_rank(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // Ignore a second init (tests, embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = rank_config_from_args(&args.common)?;
    let run = pipeline::run_catalog(&args.catalog, &config)?;

    println!("{}", crate::report::format_run_summary(&run.ranking, config.top_n));
    println!("{}", crate::report::format_leaderboard(run.ranking.top(config.top_n)));

    let written = pipeline::write_run_outputs(&args.out, &run, &config, "mrank score")?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_rank(args: RankArgs) -> Result<(), AppError> {
    let config = rank_config_from_args(&args.common)?;
    let run = pipeline::run_catalog(&args.catalog, &config)?;
    println!("{}", crate::report::format_leaderboard(run.ranking.top(config.top_n)));
    Ok(())
}

fn handle_blend(args: BlendArgs) -> Result<(), AppError> {
    let config = rank_config_from_args(&args.common)?;
    let ranking = pipeline::run_blend(&args.tables, args.allow_missing_domains, &config)?;

    println!("{}", crate::report::format_run_summary(&ranking, config.top_n));
    println!("{}", crate::report::format_leaderboard(ranking.top(config.top_n)));

    let counts = StageCounts {
        catalog: None,
        domain_rows: ranking
            .present
            .iter()
            .map(|d| {
                let rows = ranking
                    .rows
                    .iter()
                    .filter(|r| r.per_domain.get(d).is_some_and(|c| c.raw.is_some()))
                    .count();
                (*d, rows)
            })
            .collect(),
        final_rows: ranking.len(),
    };
    let written = pipeline::write_ranking_outputs(&args.out, &ranking, &config, "mrank blend", counts)?;
    for path in &written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

/// Resolve the run configuration: defaults, then `--config`, then env/flags
/// (clap already merged `MRANK_*` variables beneath their flags).
pub fn rank_config_from_args(args: &CommonArgs) -> Result<RankConfig, AppError> {
    let as_of = args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut config = RankConfig::new(as_of);

    if let Some(path) = &args.config {
        config.apply_file(ConfigFile::read(path)?);
        info!(path = %path.display(), "config file applied");
    }

    if let Some(top) = args.top {
        config.top_n = top;
    }
    if let Some(lang) = &args.lang {
        config.target_language = lang.clone();
    }
    for (domain, weight) in [
        (Domain::Content, args.w_content),
        (Domain::Rating, args.w_rating),
        (Domain::Business, args.w_business),
        (Domain::Time, args.w_time),
    ] {
        if let Some(w) = weight {
            config.weights.set(domain, w);
        }
    }
    if let Some(v) = args.winsor_low {
        config.winsor.low = v;
    }
    if let Some(v) = args.winsor_high {
        config.winsor.high = v;
    }
    if let Some(v) = args.ideal_runtime {
        config.runtime.ideal_minutes = v;
    }
    if let Some(v) = args.max_runtime_dev {
        config.runtime.max_deviation_minutes = v;
    }

    config.validate()?;
    debug!(?config, "run configuration resolved");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn args() -> CommonArgs {
        CommonArgs {
            as_of: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..CommonArgs::default()
        }
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mrank.json");
        std::fs::write(
            &path,
            r#"{"target_language": "fr", "top_n": 5, "weights": {"time": 0.5}}"#,
        )
        .unwrap();

        let config = rank_config_from_args(&CommonArgs {
            config: Some(path),
            top: Some(10),
            w_content: Some(0.1),
            ..args()
        })
        .unwrap();

        assert_eq!(config.target_language, "fr");
        assert_eq!(config.top_n, 10);
        assert_eq!(config.weights.get(Domain::Time), 0.5);
        assert_eq!(config.weights.get(Domain::Content), 0.1);
        assert_eq!(config.weights.get(Domain::Rating), 0.25);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let err = rank_config_from_args(&CommonArgs {
            winsor_low: Some(0.9),
            winsor_high: Some(0.1),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);

        let err = rank_config_from_args(&CommonArgs {
            w_content: Some(0.0),
            w_rating: Some(0.0),
            w_business: Some(0.0),
            w_time: Some(0.0),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWeightConfiguration);
    }
}
