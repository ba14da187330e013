//! # Canvas Catalog CLI (`canvas`)
//!
//! The `canvas` binary is the primary interface for the catalog. It provides
//! commands for database initialization, ingestion of the three source files,
//! filtered queries, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! canvas --config ./config/canvas.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `canvas init` | Create the SQLite database, run migrations, seed subjects and colors |
//! | `canvas sources` | Show whether each configured input file is present |
//! | `canvas ingest` | Parse the input files and link them into the catalog |
//! | `canvas query` | Filter episodes by subject, color, and month |
//! | `canvas filters` | List the subjects, colors, and months available to filter on |
//! | `canvas stats` | Row counts and per-season breakdown |
//! | `canvas serve` | Start the HTTP server |
//!
//! Diagnostics go to stderr through `tracing`; set `RUST_LOG` to adjust
//! (default `info`). Command output goes to stdout.

use canvas_catalog::{config, filter, ingest, metadata, migrate, query, server, sources, stats};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Canvas Catalog CLI: ingest and query a painting show's episode catalog.
#[derive(Parser)]
#[command(
    name = "canvas",
    about = "Canvas Catalog: ingest and query a painting show's episode catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/canvas.toml`. Database, source file, ingest, and
    /// server settings are read from this file.
    #[arg(long, global = true, default_value = "./config/canvas.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all tables, then seeds the known
    /// subjects and the pigment palette. Running it again is safe.
    Init,

    /// Show the configured input files and whether they can be read.
    Sources,

    /// Ingest the episode listing, subject table, and color table.
    ///
    /// The whole batch runs in one transaction. Re-running on the same
    /// input leaves the catalog unchanged.
    Ingest {
        /// Parse the inputs and print counts without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },

    /// Filter episodes by subject, color, and air month.
    Query {
        /// Subject name (case-insensitive). Repeatable.
        #[arg(long = "subject")]
        subjects: Vec<String>,

        /// Color name (exact). Repeatable.
        #[arg(long = "color")]
        colors: Vec<String>,

        /// Air month, 1-12. Repeatable; invalid values are ignored.
        #[arg(long = "month")]
        months: Vec<String>,

        /// How values within a dimension combine: `AND` or `OR`.
        #[arg(long, default_value = "AND")]
        mode: String,

        /// Print the response as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List subjects, colors, and months available to filter on.
    Filters {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print catalog statistics.
    Stats,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Ingest { dry_run } => {
            ingest::run_ingest(&cfg, dry_run).await?;
        }
        Commands::Query {
            subjects,
            colors,
            months,
            mode,
            json,
        } => {
            let request = filter::FilterRequest {
                subjects,
                colors,
                months,
                mode: Some(mode),
            };
            query::run_query(&cfg, &request, json).await?;
        }
        Commands::Filters { json } => {
            metadata::run_filters(&cfg, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
