//! Catalog statistics.
//!
//! Row counts for every table plus a per-season episode breakdown. Used by
//! `canvas stats` to confirm that an ingest run landed what it should have.

use anyhow::Result;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub episodes: i64,
    pub subjects: i64,
    pub colors: i64,
    pub episode_subjects: i64,
    pub episode_colors: i64,
    /// `(season, episode count)`, ascending by season.
    pub by_season: Vec<(i64, i64)>,
}

pub async fn catalog_stats(pool: &SqlitePool) -> Result<CatalogStats> {
    let mut stats = CatalogStats::default();

    for (table, slot) in [
        ("episodes", &mut stats.episodes),
        ("subjects", &mut stats.subjects),
        ("colors", &mut stats.colors),
        ("episode_subjects", &mut stats.episode_subjects),
        ("episode_colors", &mut stats.episode_colors),
    ] {
        *slot = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
    }

    let season_rows = sqlx::query(
        "SELECT season, COUNT(*) AS episode_count FROM episodes GROUP BY season ORDER BY season",
    )
    .fetch_all(pool)
    .await?;

    stats.by_season = season_rows
        .iter()
        .map(|row| (row.get("season"), row.get("episode_count")))
        .collect();

    Ok(stats)
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let stats = catalog_stats(&pool).await;
    pool.close().await;
    let stats = stats?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Canvas Catalog - Database Stats");
    println!("===============================");
    println!();
    println!("  Database:         {}", config.db.path.display());
    println!("  Size:             {}", format_bytes(db_size));
    println!();
    println!("  Episodes:         {}", stats.episodes);
    println!("  Subjects:         {}", stats.subjects);
    println!("  Colors:           {}", stats.colors);
    println!("  Subject links:    {}", stats.episode_subjects);
    println!("  Color links:      {}", stats.episode_colors);

    if !stats.by_season.is_empty() {
        println!();
        println!("  By season:");
        println!("  {:<8} {:>8}", "SEASON", "EPISODES");
        println!("  {}", "-".repeat(17));
        for (season, count) in &stats.by_season {
            println!("  {:<8} {:>8}", season, count);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
