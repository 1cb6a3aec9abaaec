mod config;
mod export;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfbase_core::seed::DATABASE_NAME;
use shelfbase_core::{DatabaseCore, FileStorage, LibrarySeeder, LogLevel, SeedReport};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(name = "shelfbase")]
#[command(about = "ShelfBase CLI - seed and inspect the library catalog database")]
#[command(version)]
struct Cli {
    /// TOML config file (default: $SHELFBASE_CONFIG if set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reset and load the sample authors, books and reviews
    Seed {
        /// Database file path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Skip the reset stage and append to existing records
        #[arg(long)]
        keep_existing: bool,
        /// Link reviews by re-reading books and matching titles
        #[arg(long)]
        resolve_by_title: bool,
        /// Print the seed report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all authors, books and reviews
    Reset {
        /// Database file path
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Export database to JSON file
    Export {
        /// Output JSON file
        file: PathBuf,
        /// Database file path
        #[arg(long)]
        db: Option<PathBuf>,
        /// Export only specific collection
        #[arg(long)]
        collection: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (db, keep_existing, resolve_by_title) = match &cli.command {
        Commands::Seed {
            db,
            keep_existing,
            resolve_by_title,
            ..
        } => (db.clone(), *keep_existing, *resolve_by_title),
        Commands::Reset { db } | Commands::Export { db, .. } => (db.clone(), false, false),
    };

    let config = Config::resolve(
        cli.config.as_deref(),
        Overrides {
            db_path: db,
            log_level: cli.log_level,
            keep_existing,
            resolve_by_title,
        },
    )?;
    init_tracing(config.log_level);
    debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Seed { json, .. } => seed(&config, json),
        Commands::Reset { .. } => reset(&config),
        Commands::Export {
            file, collection, ..
        } => run_export(&file, &config.db_path, collection.as_deref()),
    }
}

/// RUST_LOG wins over the configured level
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_database(path: &Path) -> Result<DatabaseCore<FileStorage>> {
    let db = DatabaseCore::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;

    if db.name() != DATABASE_NAME {
        warn!(
            database = %db.name(),
            expected = DATABASE_NAME,
            "database name differs from the catalog's usual namespace"
        );
    }
    Ok(db)
}

/// Run the full seeding procedure
fn seed(config: &Config, as_json: bool) -> Result<()> {
    let db = open_database(&config.db_path)?;

    let report = LibrarySeeder::with_options(&db, config.seed_options())
        .run()
        .with_context(|| format!("Seeding failed for {}", config.db_path.display()))?;

    db.close()
        .with_context(|| format!("Failed to save database: {}", config.db_path.display()))?;

    if as_json {
        let json =
            serde_json::to_string_pretty(&report).with_context(|| "Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report, &config.db_path);
    }
    Ok(())
}

fn print_report(report: &SeedReport, db_path: &Path) {
    match &report.reset {
        Some(reset) => println!(
            "Reset: removed {} authors, {} books, {} reviews",
            reset.authors, reset.books, reset.reviews
        ),
        None => println!("Reset: skipped"),
    }
    println!("Inserted {} documents into 'authors'", report.authors.len());
    println!("Inserted {} documents into 'books'", report.books.len());
    println!("Inserted {} documents into 'reviews'", report.reviews.len());
    println!(
        "Seeded database '{}' at {}",
        report.database,
        db_path.display()
    );
}

/// Run only the reset stage
fn reset(config: &Config) -> Result<()> {
    let db = open_database(&config.db_path)?;

    let summary = LibrarySeeder::new(&db)
        .reset()
        .with_context(|| format!("Reset failed for {}", config.db_path.display()))?;

    db.close()
        .with_context(|| format!("Failed to save database: {}", config.db_path.display()))?;

    println!(
        "Removed {} documents ({} authors, {} books, {} reviews)",
        summary.total(),
        summary.authors,
        summary.books,
        summary.reviews
    );
    Ok(())
}

/// Export an existing database to a JSON file
fn run_export(file: &Path, db_path: &Path, collection_filter: Option<&str>) -> Result<()> {
    let total_docs = export::export_data(file, db_path, collection_filter)?;
    println!(
        "Total: {} documents exported to {}",
        total_docs,
        file.display()
    );
    Ok(())
}
