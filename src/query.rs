//! Filtered episode retrieval.
//!
//! Executes a compiled [`EpisodeFilter`] against the catalog and shapes the
//! rows: air dates formatted as `YYYY-MM-DD`, complete subject and color tag
//! lists per episode (sorted, never null), ordered by air date with undated
//! episodes last. Used by both `canvas query` and `GET /api/episodes`.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, error};

use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};
use crate::filter::{compile, EpisodeFilter, FilterRequest, SqlParam};

/// One episode in a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeResult {
    pub episode_id: i64,
    pub title: String,
    pub season: i64,
    pub episode: i64,
    pub air_date: Option<String>,
    pub youtube_src: Option<String>,
    pub subjects: Vec<String>,
    pub colors: Vec<String>,
}

/// A full result set plus the filters that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct EpisodeQueryResponse {
    pub total_episodes: usize,
    pub episodes: Vec<EpisodeResult>,
    pub filters: EpisodeFilter,
}

/// Run the filter against the catalog.
///
/// Holds one pooled connection for the duration of the call; it returns to
/// the pool on every exit path. Storage errors fail the whole call.
pub async fn retrieve(pool: &SqlitePool, filter: &EpisodeFilter) -> Result<EpisodeQueryResponse> {
    let compiled = compile(filter);
    debug!(sql = %compiled.sql, params = ?compiled.params, "compiled episode query");

    let mut query = sqlx::query(&compiled.sql);
    for param in &compiled.params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.as_str()),
            SqlParam::Int(i) => query.bind(*i),
        };
    }

    let mut conn = pool.acquire().await.map_err(query_failed)?;
    let rows = query.fetch_all(&mut *conn).await.map_err(query_failed)?;

    let episodes = rows
        .iter()
        .map(shape_row)
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
        .map_err(query_failed)?;

    Ok(EpisodeQueryResponse {
        total_episodes: episodes.len(),
        episodes,
        filters: filter.clone(),
    })
}

fn query_failed(e: sqlx::Error) -> Error {
    error!(error = %e, "episode query failed");
    Error::Query(e)
}

fn shape_row(row: &SqliteRow) -> std::result::Result<EpisodeResult, sqlx::Error> {
    let air_date: Option<NaiveDate> = row.try_get("air_date")?;
    let subjects: Option<String> = row.try_get("subjects")?;
    let colors: Option<String> = row.try_get("colors")?;

    Ok(EpisodeResult {
        episode_id: row.try_get("episode_id")?,
        title: row.try_get("title")?,
        season: row.try_get("season")?,
        episode: row.try_get("episode")?,
        air_date: air_date.map(|d| d.format("%Y-%m-%d").to_string()),
        youtube_src: row.try_get("youtube_src")?,
        subjects: tag_list(subjects.as_deref())?,
        colors: tag_list(colors.as_deref())?,
    })
}

/// Decode an aggregated JSON array of names. A missing aggregate is an
/// empty list.
fn tag_list(json: Option<&str>) -> std::result::Result<Vec<String>, sqlx::Error> {
    let mut tags: Vec<String> = match json {
        Some(text) => serde_json::from_str::<Vec<Option<String>>>(text)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .into_iter()
            .flatten()
            .collect(),
        None => Vec::new(),
    };
    tags.sort();
    tags.dedup();
    Ok(tags)
}

/// CLI entry point: normalize the request, retrieve, and print.
pub async fn run_query(config: &Config, request: &FilterRequest, json: bool) -> anyhow::Result<()> {
    let filter = request.normalize();

    let pool = db::connect(config).await?;
    let result = retrieve(&pool, &filter).await;
    pool.close().await;
    let response = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.episodes.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!(
        "{} episode{} (subjects: [{}], colors: [{}], months: [{}], mode: {})",
        response.total_episodes,
        if response.total_episodes == 1 { "" } else { "s" },
        filter.subjects.join(", "),
        filter.colors.join(", "),
        filter
            .months
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        filter.mode
    );
    println!();

    for ep in &response.episodes {
        println!(
            "S{:02}E{:02}  {}  {}",
            ep.season,
            ep.episode,
            ep.air_date.as_deref().unwrap_or("(undated)"),
            ep.title
        );
        if let Some(ref url) = ep.youtube_src {
            println!("    video: {}", url);
        }
        println!("    subjects: {}", ep.subjects.join(", "));
        println!("    colors: {}", ep.colors.join(", "));
        println!("    id: {}", ep.episode_id);
    }

    Ok(())
}
