//! Command line entry point for fightrank
//!
//! Runs the replay over the configured match history and answers read-only
//! queries against the stored rating snapshot. All output is JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fightrank::config::AppConfig;
use fightrank::query::RatingQueries;
use fightrank::service::RatingService;
use fightrank::utils::{display_probability, display_rating};
use fightrank::RatingError;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// fightrank - dual-track Elo ratings for combat sports
#[derive(Parser)]
#[command(
    name = "fightrank",
    version,
    about = "Dual-track Elo ratings for combat-sports match histories",
    long_about = "fightrank replays a chronological match history into a cross-category \
                 rating and a per-category rating for every competitor, with an adaptive \
                 K-factor for finishes, title fights and early stoppages."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Match records override
    #[arg(long, value_name = "FILE", help = "Override the match records file")]
    matches: Option<PathBuf>,

    /// Snapshot path override
    #[arg(long, value_name = "FILE", help = "Override the rating snapshot file")]
    snapshot: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute all ratings from the match history
    Replay {
        /// Print Prometheus metrics after the run
        #[arg(long)]
        metrics: bool,
    },
    /// Ranked ratings of a track
    Leaderboard {
        /// Track to rank (defaults to the universal track)
        #[arg(long = "class")]
        track: Option<String>,
        #[arg(long, default_value_t = 5)]
        min_matches: u32,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Win probability of a hypothetical match
    Predict {
        competitor_a: String,
        competitor_b: String,
        #[arg(long = "class")]
        track: Option<String>,
    },
    /// Rating trajectory of one or more competitors
    Trajectory {
        #[arg(required = true)]
        competitors: Vec<String>,
        #[arg(long = "class")]
        track: Option<String>,
    },
    /// Ratings, record and history of a competitor
    Profile { competitor: String },
    /// Category tracks with ratings
    Tracks,
    /// Search competitors by name
    Search { query: String },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file, environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(matches) = &args.matches {
        config.storage.matches_path = matches.clone();
    }

    if let Some(snapshot) = &args.snapshot {
        config.storage.snapshot_path = snapshot.clone();
    }

    fightrank::config::validate_config(&config)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(args: &Args, config: &AppConfig) -> Result<()> {
    let service = RatingService::from_config(config)?;

    if let Command::Replay { metrics } = &args.command {
        info!(
            "Replaying {} into {}",
            config.storage.matches_path.display(),
            config.storage.snapshot_path.display()
        );
        let summary = service.run_replay()?;
        print_json(&summary)?;
        if *metrics {
            print!("{}", service.metrics().gather_text()?);
        }
        return Ok(());
    }

    let snapshot = service.snapshot()?;
    let queries = RatingQueries::new(&snapshot, service.universal_track());
    let track_or_default = |track: &Option<String>| {
        track
            .clone()
            .unwrap_or_else(|| service.universal_track().to_string())
    };

    match &args.command {
        Command::Replay { .. } => unreachable!("handled above"),
        Command::Leaderboard {
            track,
            min_matches,
            limit,
        } => {
            let track = track_or_default(track);
            let mut rows = queries.leaderboard(&track, *min_matches, *limit);
            if rows.is_empty() {
                error!("No ratings for track {:?}", track);
                print_json(&queries.tracks())?;
                std::process::exit(1);
            }
            for row in &mut rows {
                row.rating = display_rating(row.rating);
            }
            print_json(&rows)
        }
        Command::Predict {
            competitor_a,
            competitor_b,
            track,
        } => {
            let track = track_or_default(track);
            match queries.predict(competitor_a, competitor_b, &track) {
                Ok(mut prediction) => {
                    for side in [&mut prediction.competitor_a, &mut prediction.competitor_b] {
                        side.rating = display_rating(side.rating);
                        side.win_probability = display_probability(side.win_probability);
                    }
                    print_json(&prediction)
                }
                Err(e) => {
                    if let Some(RatingError::CompetitorNotFound { competitor, .. }) =
                        e.downcast_ref::<RatingError>()
                    {
                        let suggestions = queries.search(competitor);
                        if !suggestions.is_empty() {
                            eprintln!("Did you mean: {}", suggestions.join(", "));
                        }
                    }
                    Err(e)
                }
            }
        }
        Command::Trajectory { competitors, track } => {
            let track = track_or_default(track);
            let trajectories: std::collections::BTreeMap<&str, _> = competitors
                .iter()
                .map(|name| (name.as_str(), queries.trajectory_points(name, &track)))
                .filter(|(_, points)| !points.is_empty())
                .collect();
            print_json(&trajectories)
        }
        Command::Profile { competitor } => match queries.profile(competitor) {
            Some(profile) => print_json(&profile),
            None => Err(RatingError::CompetitorNotFound {
                competitor: competitor.clone(),
                track: "any".to_string(),
            }
            .into()),
        },
        Command::Tracks => print_json(&queries.tracks()),
        Command::Search { query } => print_json(&queries.search(query)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&args, &config) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
