//! Ingestion pipeline orchestration.
//!
//! Reads the three source files in full, parses them, and links the
//! records into the catalog inside a single transaction: either the whole
//! batch commits or nothing does. Individual malformed or unresolvable
//! records are skipped and counted, never fatal.

use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};
use crate::link::{LinkStats, Linker};
use crate::models::{ColorRecord, ListingRecord, Parsed, SubjectRecord};
use crate::source_colors::parse_color_table;
use crate::source_listing::parse_listing;
use crate::source_subjects::parse_subject_table;

/// Parsed contents of all three source files.
#[derive(Debug, Clone)]
pub struct ParsedSources {
    pub listing: Parsed<ListingRecord>,
    pub subjects: Parsed<SubjectRecord>,
    pub colors: Parsed<ColorRecord>,
}

pub fn read_sources(config: &Config) -> Result<ParsedSources> {
    let listing_bytes = read_file(&config.sources.episodes)?;
    let subjects_bytes = read_file(&config.sources.subjects)?;
    let colors_bytes = read_file(&config.sources.colors)?;

    let listing = parse_listing(&listing_bytes, config.ingest.season_size);
    info!(
        records = listing.records.len(),
        skipped = listing.skipped.len(),
        "parsed episode listing"
    );

    let subjects = parse_subject_table(&subjects_bytes)?;
    info!(
        records = subjects.records.len(),
        skipped = subjects.skipped.len(),
        "parsed subject table"
    );

    let colors = parse_color_table(&colors_bytes)?;
    info!(
        records = colors.records.len(),
        skipped = colors.skipped.len(),
        "parsed color table"
    );

    Ok(ParsedSources {
        listing,
        subjects,
        colors,
    })
}

/// Read a whole input as bytes; the parsers decode per line or record.
fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::Input {
        path: path.to_path_buf(),
        source,
    })
}

/// Link every parsed record in one transaction.
///
/// Running this twice on the same input leaves the catalog unchanged after
/// the first run: episodes are upserted and association inserts ignore
/// existing pairs.
pub async fn ingest(pool: &SqlitePool, sources: &ParsedSources) -> Result<LinkStats> {
    let mut tx = pool.begin().await.map_err(Error::Ingestion)?;
    let mut linker = Linker::new();

    match link_all(&mut linker, &mut *tx, sources).await {
        Ok(()) => {
            tx.commit().await.map_err(Error::Ingestion)?;
            let stats = linker.stats().clone();
            info!(?stats, "ingestion committed");
            Ok(stats)
        }
        Err(e) => {
            error!(error = %e, "ingestion failed, rolling back batch");
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "explicit rollback failed; connection drop discards the batch");
            }
            Err(Error::Ingestion(e))
        }
    }
}

async fn link_all(
    linker: &mut Linker,
    conn: &mut SqliteConnection,
    sources: &ParsedSources,
) -> std::result::Result<(), sqlx::Error> {
    linker.upsert_episodes(conn, &sources.listing.records).await?;
    linker.link_subjects(conn, &sources.subjects.records).await?;
    linker.link_colors(conn, &sources.colors.records).await?;
    Ok(())
}

pub async fn run_ingest(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let sources = read_sources(config)?;

    if dry_run {
        println!("ingest (dry-run)");
        print_parse_counts(&sources);
        return Ok(());
    }

    let pool = db::connect(config).await?;
    let result = ingest(&pool, &sources).await;
    pool.close().await;
    let stats = result?;

    println!("ingest");
    print_parse_counts(&sources);
    println!("  episodes upserted: {}", stats.episodes_upserted);
    println!("  subject links added: {}", stats.subject_links_added);
    println!("  color links added: {}", stats.color_links_added);
    println!("  videos set: {}", stats.videos_set);
    println!("  records dropped: {}", stats.dropped);
    println!("ok");

    Ok(())
}

fn print_parse_counts(sources: &ParsedSources) {
    println!(
        "  episodes parsed: {} (skipped {})",
        sources.listing.records.len(),
        sources.listing.skipped.len()
    );
    println!(
        "  subject flags parsed: {} (skipped {})",
        sources.subjects.records.len(),
        sources.subjects.skipped.len()
    );
    println!(
        "  color rows parsed: {} (skipped {})",
        sources.colors.records.len(),
        sources.colors.skipped.len()
    );
}
