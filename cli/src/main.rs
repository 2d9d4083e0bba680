use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use itemseed_core::file_utils::{read_manifest, write_seed};
use itemseed_core::{discover, Classification, Classifier, ImportConfig, Importer, TemplateStore};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_CONFIG: &str = "itemseed.toml";

#[derive(Parser)]
#[command(
    name = "itemseed",
    version = "0.1.0",
    about = "Generate loot-list item seed data from a game database",
    long_about = None
)]
struct Cli {
    /// Path to TOML configuration file (default: ./itemseed.toml when present)
    #[arg(long, global = true, env = "ITEMSEED_CONFIG")]
    config: Option<PathBuf>,

    /// Path to log file
    #[arg(long, global = true, default_value = "/tmp/itemseed.log")]
    log_file: PathBuf,

    /// Verbosity level (repeat for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every item in the manifest and write the seed file
    Import {
        /// Path to SQLite template database
        #[arg(long, env = "ITEMSEED_DATABASE")]
        database: Option<PathBuf>,
        /// Path to instance/encounter manifest JSON
        #[arg(long, env = "ITEMSEED_MANIFEST")]
        manifest: Option<PathBuf>,
        /// Path to write the item seed JSON
        #[arg(long, env = "ITEMSEED_OUTPUT")]
        output: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(long, default_value_t = false)]
        no_progress: bool,
    },

    /// Classify individual items and print them as JSON
    Classify {
        /// Item IDs to classify
        #[arg(required = true)]
        ids: Vec<u32>,
        /// Path to SQLite template database
        #[arg(long, env = "ITEMSEED_DATABASE")]
        database: Option<PathBuf>,
    },

    /// Print the distinct item IDs listed in the manifest
    Discover {
        /// Path to instance/encounter manifest JSON
        #[arg(long, env = "ITEMSEED_MANIFEST")]
        manifest: Option<PathBuf>,
    },

    /// Create empty template tables in a SQLite database
    InitStore {
        /// Path to SQLite template database
        #[arg(long)]
        database: PathBuf,
    },
}

fn setup_logging(verbose: u8, log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let filter_level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::from_default_env().add_directive(filter_level.into());

    let file_appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(Path::new(".")),
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("itemseed.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::Layer::new().with_writer(std::io::stderr).with_ansi(true))
        .with(fmt::Layer::new().with_writer(non_blocking).with_ansi(false));

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(guard)
}

fn load_config(path: Option<&Path>) -> Result<ImportConfig> {
    match path {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path)),
        None if Path::new(DEFAULT_CONFIG).exists() => ImportConfig::from_file(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG)),
        None => Ok(ImportConfig::default()),
    }
}

fn require(value: Option<PathBuf>, fallback: Option<&PathBuf>, what: &str, flag: &str) -> Result<PathBuf> {
    value
        .or_else(|| fallback.cloned())
        .with_context(|| format!("No {} given; pass --{} or set it in the config file", what, flag))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = setup_logging(cli.verbose, &cli.log_file)?;

    info!("Starting itemseed CLI");

    match cli.command {
        Commands::Import { database, manifest, output, no_progress } => {
            let config = load_config(cli.config.as_deref())?;
            let db_path = require(database, config.database.as_ref(), "template database", "database")?;
            let manifest_path = require(manifest, config.seed_instances_path.as_ref(), "manifest", "manifest")?;
            let output_path = require(output, config.seed_items_path.as_ref(), "output path", "output")?;

            let instances = read_manifest(&manifest_path)
                .with_context(|| format!("Failed to read manifest {:?}", manifest_path))?;
            let ids = discover(&instances);
            info!("Discovered {} distinct items in {} instances", ids.len(), instances.len());

            let store = TemplateStore::open(&db_path)?;
            let templates = store.load_snapshot()?;
            let classifier = Classifier::with_healing_overrides(&templates, config.healing_override_items.iter().copied());
            let importer = Importer::new(&classifier, &config.tokens);

            let progress = if no_progress {
                ProgressBar::hidden()
            } else {
                ProgressBar::new(ids.len() as u64)
            };
            progress.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let report = importer.run(&ids, |id| {
                progress.set_message(format!("#{}", id));
                progress.inc(1);
            });
            progress.finish_and_clear();

            info!("Parsed {} items. Saving to seed file.", report.items.len());
            write_seed(&output_path, &report.items)
                .with_context(|| format!("Failed to write seed file {:?}", output_path))?;

            info!("--- Summary ---");
            info!("Discovered: {}", report.discovered);
            info!("Written: {} ({} token rewards)", report.items.len(), report.token_rewards);
            info!("Skipped (not found): {}", report.not_found);
            info!("Skipped (not epic): {}", report.wrong_quality);
            let review = report
                .items
                .iter()
                .filter(|item| item.has_on_use || item.has_proc || item.has_special)
                .count();
            info!("Flagged for manual review: {}", review);
        }
        Commands::Classify { ids, database } => {
            let config = load_config(cli.config.as_deref())?;
            let db_path = require(database, config.database.as_ref(), "template database", "database")?;

            let store = TemplateStore::open(&db_path)?;
            let templates = store.load_snapshot()?;
            let classifier = Classifier::with_healing_overrides(&templates, config.healing_override_items.iter().copied());

            let items: Vec<_> = ids
                .iter()
                .filter_map(|&id| match classifier.classify(id, None) {
                    Classification::Classified(item) => Some(item),
                    Classification::Skipped(reason) => {
                        tracing::warn!("Item #{} skipped: {}", id, reason);
                        None
                    }
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        Commands::Discover { manifest } => {
            let config = load_config(cli.config.as_deref())?;
            let manifest_path = require(manifest, config.seed_instances_path.as_ref(), "manifest", "manifest")?;

            let instances = read_manifest(&manifest_path)
                .with_context(|| format!("Failed to read manifest {:?}", manifest_path))?;
            for id in discover(&instances) {
                println!("{}", id);
            }
        }
        Commands::InitStore { database } => {
            TemplateStore::create(&database)?;
            info!("Created template tables in {:?}", database);
        }
    }

    info!("itemseed CLI finished");
    Ok(())
}
