use clap::{Parser, Subcommand};
use figment::providers::Serialized;
use podcast_ingest::{
    Config, Database, Error, IsRetryable, Pipeline, Result, StoredEpisode, ToExitCode,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Fetch a podcast feed, record new episodes and download their audio.
///
/// Each invocation performs a single pass; schedule it externally.
#[derive(Debug, Parser)]
#[command(name = "podcast-ingest", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "PODCAST_INGEST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the feed URL
    #[arg(long, global = true)]
    feed_url: Option<String>,

    /// Override the SQLite database path
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Override the audio directory
    #[arg(long, global = true)]
    episodes_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one ingestion pass
    Run {
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List stored episodes
    List {
        /// Print episodes as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(
                code = e.error_code(),
                retryable = e.is_retryable(),
                "{}",
                e
            );
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    match args.command {
        Command::Run { json } => {
            let db = Database::new(&config.database_path).await?;
            let pipeline = Pipeline::from_config(&config, db)?;

            let result = pipeline.run().await;
            pipeline.close().await;
            let report = result?;

            if json {
                println!("{}", to_json(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::List { json } => {
            let db = Database::new(&config.database_path).await?;
            let episodes = match db.ensure_schema().await {
                Ok(()) => db.episodes().await,
                Err(e) => Err(e),
            };
            db.close().await;
            let episodes = episodes?;

            if json {
                println!("{}", to_json(&episodes)?);
            } else {
                for episode in &episodes {
                    println!("{}", format_row(episode));
                }
            }
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    if let Some(path) = &args.config
        && !path.is_file()
    {
        return Err(Error::config(
            "config",
            format!("configuration file {} does not exist", path.display()),
        ));
    }

    let mut figment = Config::figment(args.config.as_deref());
    if let Some(url) = &args.feed_url {
        figment = figment.merge(Serialized::default("feed_url", url));
    }
    if let Some(path) = &args.database {
        figment = figment.merge(Serialized::default("database_path", path));
    }
    if let Some(dir) = &args.episodes_dir {
        figment = figment.merge(Serialized::default("episodes_dir", dir));
    }

    Config::from_figment(figment)
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("info,podcast_ingest=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout is reserved for the report
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::Other(format!("Failed to serialize output: {}", e)))
}

fn format_row(episode: &StoredEpisode) -> String {
    format!(
        "{}\t{}\t{}",
        episode.filename.as_deref().unwrap_or("-"),
        episode.date_of_publish.as_deref().unwrap_or("-"),
        episode.title.as_deref().unwrap_or("-"),
    )
}
