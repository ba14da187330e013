//! Normalizer/linker.
//!
//! Writes parsed records into the normalized model. Episodes are upserted
//! by (season, episode); subjects and colors are inserted if absent and then
//! referenced by identity; association rows are inserted once and never
//! updated. Records that point at an episode the catalog does not know are
//! dropped and logged.
//!
//! Every method takes the connection to write on, so a whole batch can run
//! inside one transaction owned by the caller.

use sqlx::SqliteConnection;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::error::SkipReason;
use crate::models::{ColorRecord, ListingRecord, Pigment, SubjectRecord};

/// Counters for one linking run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkStats {
    pub episodes_upserted: u64,
    pub subject_links_added: u64,
    pub color_links_added: u64,
    pub videos_set: u64,
    pub dropped: u64,
}

/// Identity caches and counters for one batch.
#[derive(Debug, Default)]
pub struct Linker {
    subjects: HashMap<String, i64>,
    colors: HashMap<&'static str, i64>,
    episodes: HashMap<(i64, i64), Option<i64>>,
    stats: LinkStats,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub async fn upsert_episodes(
        &mut self,
        conn: &mut SqliteConnection,
        records: &[ListingRecord],
    ) -> Result<(), sqlx::Error> {
        for rec in records {
            let episode_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO episodes (season, episode, title, air_date)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(season, episode) DO UPDATE SET
                    title = excluded.title,
                    air_date = excluded.air_date
                RETURNING episode_id
                "#,
            )
            .bind(rec.season)
            .bind(rec.episode)
            .bind(&rec.title)
            .bind(rec.air_date)
            .fetch_one(&mut *conn)
            .await?;

            self.episodes
                .insert((rec.season, rec.episode), Some(episode_id));
            self.stats.episodes_upserted += 1;
        }
        Ok(())
    }

    pub async fn link_subjects(
        &mut self,
        conn: &mut SqliteConnection,
        records: &[SubjectRecord],
    ) -> Result<(), sqlx::Error> {
        for rec in records {
            let Some(episode_id) = self.resolve_episode(conn, rec.season, rec.episode).await?
            else {
                continue;
            };
            let subject_id = self.ensure_subject(conn, &rec.subject).await?;

            let result = sqlx::query(
                "INSERT INTO episode_subjects (episode_id, subject_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            )
            .bind(episode_id)
            .bind(subject_id)
            .execute(&mut *conn)
            .await?;
            self.stats.subject_links_added += result.rows_affected();
        }
        Ok(())
    }

    pub async fn link_colors(
        &mut self,
        conn: &mut SqliteConnection,
        records: &[ColorRecord],
    ) -> Result<(), sqlx::Error> {
        for rec in records {
            let Some(episode_id) = self.resolve_episode(conn, rec.season, rec.episode).await?
            else {
                continue;
            };

            for pigment in rec.colors.iter().copied() {
                let color_id = self.ensure_color(conn, pigment).await?;
                let result = sqlx::query(
                    "INSERT INTO episode_colors (episode_id, color_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
                )
                .bind(episode_id)
                .bind(color_id)
                .execute(&mut *conn)
                .await?;
                self.stats.color_links_added += result.rows_affected();
            }

            if let Some(ref src) = rec.youtube_src {
                let result = sqlx::query(
                    "UPDATE episodes SET youtube_src = ? WHERE episode_id = ? AND youtube_src IS NOT ?",
                )
                .bind(src)
                .bind(episode_id)
                .bind(src)
                .execute(&mut *conn)
                .await?;
                self.stats.videos_set += result.rows_affected();
            }
        }
        Ok(())
    }

    async fn resolve_episode(
        &mut self,
        conn: &mut SqliteConnection,
        season: i64,
        episode: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let episode_id = match self.episodes.get(&(season, episode)) {
            Some(cached) => *cached,
            None => {
                let found: Option<i64> = sqlx::query_scalar(
                    "SELECT episode_id FROM episodes WHERE season = ? AND episode = ?",
                )
                .bind(season)
                .bind(episode)
                .fetch_optional(&mut *conn)
                .await?;
                self.episodes.insert((season, episode), found);
                found
            }
        };

        if episode_id.is_none() {
            let reason = SkipReason::UnknownEpisode { season, episode };
            warn!(%reason, "dropping record");
            self.stats.dropped += 1;
        }
        Ok(episode_id)
    }

    async fn ensure_subject(
        &mut self,
        conn: &mut SqliteConnection,
        name: &str,
    ) -> Result<i64, sqlx::Error> {
        if let Some(id) = self.subjects.get(name) {
            return Ok(*id);
        }

        let category = classify(name);
        let inserted = sqlx::query(
            "INSERT INTO subjects (name, category) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(category.as_str())
        .execute(&mut *conn)
        .await?;
        if inserted.rows_affected() > 0 {
            debug!(subject = name, %category, "added subject");
        }

        let id: i64 = sqlx::query_scalar("SELECT subject_id FROM subjects WHERE name = ?")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
        self.subjects.insert(name.to_string(), id);
        Ok(id)
    }

    async fn ensure_color(
        &mut self,
        conn: &mut SqliteConnection,
        pigment: &'static Pigment,
    ) -> Result<i64, sqlx::Error> {
        if let Some(id) = self.colors.get(pigment.name) {
            return Ok(*id);
        }

        let inserted = sqlx::query(
            "INSERT INTO colors (name, hex_code) VALUES (?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(pigment.name)
        .bind(pigment.hex_code)
        .execute(&mut *conn)
        .await?;
        if inserted.rows_affected() > 0 {
            debug!(color = pigment.name, "added color");
        }

        let id: i64 = sqlx::query_scalar("SELECT color_id FROM colors WHERE name = ?")
            .bind(pigment.name)
            .fetch_one(&mut *conn)
            .await?;
        self.colors.insert(pigment.name, id);
        Ok(id)
    }
}
