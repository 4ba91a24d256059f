use anyhow::{anyhow, Result};
use clap::Parser;
use kindred_etl::{Config, RangeSource, RankOptions};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "kindred", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/kindred/kindred.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Load a provider snapshot file into the database
    ///
    /// The file is JSON with a partition date and the artists, top tracks
    /// and audio features captured on that date:
    ///
    ///   { "dt": "2023-01-17", "artists": [...], "top_tracks": [...],
    ///     "audio_features": [...] }
    ///
    /// All rows are written in one transaction and keyed by partition, so
    /// ingesting the same file twice changes nothing.
    Ingest {
        /// Path to the snapshot file
        file: PathBuf,
    },
    /// Recompute the related-artist table from the latest partition
    ///
    /// Averages each artist's top-track features, normalizes every metric
    /// against its population range, and keeps the K nearest artists by
    /// Euclidean distance. Artists with identical profiles are never
    /// related to each other. Existing edges are updated in place.
    Rank {
        /// Related artists kept per artist (default from config, 5)
        #[arg(long)]
        k: Option<usize>,

        /// Normalization ranges: artists or tracks
        #[arg(long)]
        range_source: Option<RangeSource>,
    },
    /// Run the full ingest → rank pipeline
    Process {
        /// Snapshot file to ingest first; omit to rank stored data
        file: Option<PathBuf>,

        /// Related artists kept per artist (default from config, 5)
        #[arg(long)]
        k: Option<usize>,

        /// Normalization ranges: artists or tracks
        #[arg(long)]
        range_source: Option<RangeSource>,
    },
    /// Show the stored related artists of an artist with their top tracks
    Related {
        /// Artist id, or artist name (case-insensitive)
        artist: String,

        /// Number of related artists to show
        #[arg(long, default_value_t = 3)]
        limit: usize,

        /// Top tracks shown per artist
        #[arg(long, default_value_t = 3)]
        tracks: usize,
    },
    /// Show database status
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn init_logging(config: &Config) -> Result<()> {
    let level = match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" => twyg::LogLevel::Trace,
        "debug" => twyg::LogLevel::Debug,
        "info" => twyg::LogLevel::Info,
        "warn" | "warning" => twyg::LogLevel::Warn,
        "error" => twyg::LogLevel::Error,
        other => return Err(anyhow!("Unknown log level: {other}")),
    };

    let opts = twyg::OptsBuilder::new()
        .coloured(config.logging.coloured)
        .level(level)
        .report_caller(config.logging.report_caller)
        .build()
        .map_err(|e| anyhow!("Invalid logging options: {e}"))?;

    twyg::setup(opts).map_err(|e| anyhow!("Failed to set up logging: {e}"))?;
    Ok(())
}

/// Configured ranking options with CLI overrides applied.
fn rank_options(config: &Config, k: Option<usize>, range_source: Option<RangeSource>) -> RankOptions {
    let mut options = config.rank_options();
    if let Some(k) = k {
        options.k = k;
    }
    if let Some(range_source) = range_source {
        options.range_source = range_source;
    }
    options
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };
    init_logging(&config)?;

    let db_path = config.database_path.clone();

    // Ensure database directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Ingest { file } => {
            commands::run_ingest(file, db_path)?;
        }
        Commands::Rank { k, range_source } => {
            let options = rank_options(&config, k, range_source);
            commands::run_rank(db_path, options).await?;
        }
        Commands::Process {
            file,
            k,
            range_source,
        } => {
            let options = rank_options(&config, k, range_source);
            commands::run_process(file, db_path, options).await?;
        }
        Commands::Related {
            artist,
            limit,
            tracks,
        } => {
            commands::show_related(db_path, &artist, limit, tracks)?;
        }
        Commands::Status => {
            commands::show_status(db_path)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
