mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sceneit_core::{load_config, validate_config};

#[derive(Parser)]
#[command(name = "sceneit")]
#[command(about = "Personalized movie discovery from the command line", version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SCENEIT_CONFIG", default_value = "sceneit.toml")]
    config: PathBuf,

    /// Act as this user (overrides identity.user_id)
    #[arg(short, long, env = "SCENEIT_USER")]
    user: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Dump Prometheus metrics to stderr when done
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the recommendation sections
    Discover {
        /// Only show these categories (e.g. interests, watched)
        #[arg(short, long)]
        filter: Vec<String>,
    },
    /// Search the catalog by title
    Search {
        term: String,
    },
    /// Show one page of genre rows
    Browse {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Replace the user's genre interests
    Interests {
        genre_ids: Vec<u32>,
    },
    /// Record a favorite, unfavorite or watch
    Interact {
        movie_id: u32,
        /// favorited, unfavorited or watched
        action: String,
        #[arg(short, long)]
        rating: Option<u8>,
    },
    /// Print the effective configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    let registry = prometheus::Registry::new();
    sceneit_core::metrics::register_metrics(&registry).context("Failed to register metrics")?;

    let app = commands::App::new(config, cli.user.as_deref()).await?;
    let output = match cli.command {
        Command::Discover { filter } => app.discover(&filter).await?,
        Command::Search { term } => app.search(&term).await?,
        Command::Browse { page } => app.browse(page).await?,
        Command::Interests { genre_ids } => app.replace_interests(&genre_ids).await?,
        Command::Interact {
            movie_id,
            action,
            rating,
        } => app.interact(movie_id, &action, rating).await?,
        Command::Config => app.sanitized_config()?,
    };
    println!("{}", output);

    if cli.metrics {
        eprint!("{}", commands::encode_metrics(&registry)?);
    }
    Ok(())
}

fn init_logging(json: bool) {
    // Logs go to stderr; stdout carries the JSON result.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sceneit_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_discover_with_filters() {
        let cli = Cli::try_parse_from([
            "sceneit", "--user", "alice", "discover", "-f", "interests", "-f", "watched",
        ])
        .unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        match cli.command {
            Command::Discover { filter } => assert_eq!(filter, vec!["interests", "watched"]),
            _ => panic!("expected discover"),
        }
    }

    #[test]
    fn test_parse_interact() {
        let args = ["sceneit", "interact", "550", "watched", "--rating", "8"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Interact {
                movie_id,
                action,
                rating,
            } => {
                assert_eq!(movie_id, 550);
                assert_eq!(action, "watched");
                assert_eq!(rating, Some(8));
            }
            _ => panic!("expected interact"),
        }
    }
}
