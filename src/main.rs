use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use memap::config::Config;
use memap::pipeline::{
    correlator::{DEFAULT_LIMIT, DEFAULT_PER_PLATFORM},
    Correlator, FootprintRequest,
};

/// MeMap: digital footprint mapping and impersonation analysis.
///
/// Looks an identity up across public platforms, maps what it finds into a
/// graph, and scores how likely one account is to be impersonating another.
#[derive(Parser)]
#[command(name = "memap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map an identity's footprint across platforms
    Footprint {
        /// Known username to look up on every platform
        #[arg(long, conflicts_with = "full_name", required_unless_present = "full_name")]
        username: Option<String>,

        /// Display name to expand into candidate usernames
        #[arg(long)]
        full_name: Option<String>,

        /// Max platform nodes for a name expansion (1-25)
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Max nodes per platform (1-10)
        #[arg(long, default_value_t = DEFAULT_PER_PLATFORM)]
        per_platform: usize,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compare two identities for impersonation
    Compare {
        /// The original identity
        user_a: String,

        /// The suspected impersonator
        user_b: String,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show which sources and similarity features are configured
    Status,

    /// Download the sentence embedding model (~90 MB)
    DownloadModel,

    /// Serve the JSON API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("memap=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Footprint {
            username,
            full_name,
            limit,
            per_platform,
            json,
        } => {
            let config = Config::load()?;
            config.warn_if_embedding_model_missing();
            let correlator = Correlator::from_config(&config)?;

            let request = FootprintRequest {
                username,
                full_name,
                limit,
                per_platform,
            };

            let spinner = spinner(json, "Searching public platforms...");
            let result = correlator.footprint(&request).await;
            spinner.finish_and_clear();
            let report = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                memap::output::terminal::display_footprint(&report);
            }
        }

        Commands::Compare {
            user_a,
            user_b,
            json,
        } => {
            let config = Config::load()?;
            config.warn_if_embedding_model_missing();
            let correlator = Correlator::from_config(&config)?;

            let spinner = spinner(json, "Collecting and comparing profiles...");
            let result = correlator.compare(&user_a, &user_b).await;
            spinner.finish_and_clear();
            let report = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                memap::output::terminal::display_comparison(&report);
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            println!("{}", "MeMap status".bold());
            memap::status::show(&config);
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            let model_dir = &config.model_dir;

            println!("Downloading sentence embedding model...");
            println!("  Destination: {}", model_dir.display());

            memap::similarity::download::download_model(model_dir).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("Set ENABLE_EMBEDDINGS=true to use it for bio comparison.");
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.warn_if_embedding_model_missing();
            let correlator = Correlator::from_config(&config)?;
            info!(sources = correlator.fetchers().len(), "Starting API server");
            memap::web::run_server(correlator, port, &bind).await?;
        }
    }

    Ok(())
}

/// A spinner on stderr, hidden when printing JSON so stdout stays clean.
fn spinner(hidden: bool, message: &'static str) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
