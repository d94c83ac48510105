use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use locations::{
    config::{Config, Options},
    geocode::ProviderChain,
    merge,
    sources::{self, Categories, Record},
    store, utils,
};

/// Geocode customer locations into a GeoJSON feature collection, only asking
/// providers about addresses the collection doesn't already have.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rows from a tabular JSON export
    Api {
        #[arg(long, env = "LOCATIONS_URL", hide_env_values = true)]
        url: String,

        #[command(flatten)]
        options: Options,
    },
    /// Rows from a retail accounts CSV
    Csv {
        path: PathBuf,

        /// Market type to category table (YAML)
        #[arg(long)]
        categories: Option<PathBuf>,

        #[command(flatten)]
        options: Options,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "locations=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let (records, options) = match cli.command {
        Command::Api { url, options } => {
            info!("Fetching records from {}", redact(&url));
            let agent = utils::agent(Config::from(&options).timeout);
            let records = sources::api::fetch(&agent, &url)
                .with_context(|| format!("Failed to fetch {}", redact(&url)))?;
            (records, options)
        }
        Command::Csv {
            path,
            categories,
            options,
        } => {
            let categories = match categories {
                Some(x) => Categories::load(&x)?,
                None => Categories::default(),
            };
            info!("Reading records from {}", path.display());
            let records = sources::csv::read(&path, &categories)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (records, options)
        }
    };

    run(&records, &options)
}

fn run(records: &[Record], options: &Options) -> Result<()> {
    let config = Config::from(options);
    info!("{} records", records.len());

    let existing = store::load(&options.store)?;
    info!(
        "{} features in {}",
        existing.len(),
        options.store.display()
    );

    let chain = ProviderChain::from_config(&config);
    info!("Providers: {}", chain.names().join(", "));
    if let Some(x) = &config.region {
        info!("Keeping only locations in {}", x.code());
    }

    let (output, stats) = merge::merge(records, existing, &chain, config.region.as_ref());
    info!("{stats}");

    if options.dry_run {
        info!(
            "Dry run, {} features not written to {}",
            output.len(),
            options.store.display()
        );
        return Ok(());
    }

    store::save(&options.store, &output)?;
    info!("Wrote {} features to {}", output.len(), options.store.display());

    Ok(())
}

/// Export URLs carry their access token in the query string.
fn redact(url: &str) -> &str {
    url.split_once('?').map(|(x, _)| x).unwrap_or(url)
}
