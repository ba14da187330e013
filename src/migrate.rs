use anyhow::Result;
use sqlx::SqlitePool;

use crate::classify::known_subjects;
use crate::config::Config;
use crate::db;
use crate::source_colors::PALETTE;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    seed_dimensions(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create every table and index. Safe to run repeatedly.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    // Create episodes table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS episodes (
            episode_id INTEGER PRIMARY KEY AUTOINCREMENT,
            season INTEGER NOT NULL,
            episode INTEGER NOT NULL,
            title TEXT NOT NULL,
            air_date TEXT,
            youtube_src TEXT,
            UNIQUE(season, episode)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create subjects table (names match case-insensitively)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subjects (
            subject_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE,
            category TEXT NOT NULL,
            UNIQUE(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create colors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS colors (
            color_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            hex_code TEXT,
            UNIQUE(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Association tables
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS episode_subjects (
            episode_id INTEGER NOT NULL,
            subject_id INTEGER NOT NULL,
            PRIMARY KEY (episode_id, subject_id),
            FOREIGN KEY (episode_id) REFERENCES episodes(episode_id),
            FOREIGN KEY (subject_id) REFERENCES subjects(subject_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS episode_colors (
            episode_id INTEGER NOT NULL,
            color_id INTEGER NOT NULL,
            PRIMARY KEY (episode_id, color_id),
            FOREIGN KEY (episode_id) REFERENCES episodes(episode_id),
            FOREIGN KEY (color_id) REFERENCES colors(color_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_episodes_air_date ON episodes(air_date)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_episode_subjects_subject ON episode_subjects(subject_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_episode_colors_color ON episode_colors(color_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert the known subjects and the palette colors if they are absent.
pub async fn seed_dimensions(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (name, category) in known_subjects() {
        sqlx::query(
            "INSERT INTO subjects (name, category) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(category.as_str())
        .execute(&mut *tx)
        .await?;
    }

    for pigment in PALETTE {
        sqlx::query("INSERT INTO colors (name, hex_code) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(pigment.name)
            .bind(pigment.hex_code)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}
