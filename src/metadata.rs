//! Filter metadata listing.
//!
//! Lists every known subject (with its category), every known color (with
//! its hex code), and the distinct air-date months present in the catalog.
//! Used by both the `canvas filters` CLI command and `GET /api/filters`.

use chrono::Month;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectOption {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorOption {
    pub name: String,
    pub hex_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub month_num: u32,
    pub month_name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub subjects: Vec<SubjectOption>,
    pub colors: Vec<ColorOption>,
    pub months: Vec<MonthOption>,
}

/// Core listing function returning structured data (used by CLI and server).
pub async fn list_filter_options(pool: &SqlitePool) -> Result<FilterOptions> {
    let mut conn = pool.acquire().await.map_err(Error::Query)?;

    let subjects = sqlx::query("SELECT name, category FROM subjects ORDER BY name")
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)?
        .iter()
        .map(|row| {
            Ok(SubjectOption {
                name: row.try_get("name")?,
                category: row.try_get("category")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
        .map_err(Error::Query)?;

    let colors = sqlx::query("SELECT name, hex_code FROM colors ORDER BY name")
        .fetch_all(&mut *conn)
        .await
        .map_err(Error::Query)?
        .iter()
        .map(|row| {
            Ok(ColorOption {
                name: row.try_get("name")?,
                hex_code: row.try_get("hex_code")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()
        .map_err(Error::Query)?;

    let month_nums: Vec<i64> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT CAST(strftime('%m', air_date) AS INTEGER) AS month_num
        FROM episodes
        WHERE air_date IS NOT NULL
        ORDER BY month_num
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(Error::Query)?;

    Ok(FilterOptions {
        subjects,
        colors,
        months: month_nums.into_iter().filter_map(month_option).collect(),
    })
}

fn month_option(num: i64) -> Option<MonthOption> {
    let month = Month::try_from(u8::try_from(num).ok()?).ok()?;
    Some(MonthOption {
        month_num: month.number_from_month(),
        month_name: month.name(),
    })
}

/// CLI entry point: list filter options and print them.
pub async fn run_filters(config: &Config, json: bool) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let result = list_filter_options(&pool).await;
    pool.close().await;
    let options = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!("Subjects ({}):", options.subjects.len());
    for s in &options.subjects {
        println!("  {:<24} {}", s.name, s.category);
    }
    println!();

    println!("Colors ({}):", options.colors.len());
    for c in &options.colors {
        println!("  {:<24} {}", c.name, c.hex_code.as_deref().unwrap_or("-"));
    }
    println!();

    println!("Months ({}):", options.months.len());
    for m in &options.months {
        println!("  {:>2}  {}", m.month_num, m.month_name);
    }

    Ok(())
}
