//! Subject flag table parser.
//!
//! The table carries an `EPISODE` code column (`S01E01`), optionally a
//! `TITLE` column and an unnamed index column, and one `0`/`1` column per
//! subject. Columns are located by header name, so their order is free.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result, SkipReason};
use crate::models::{Parsed, SubjectRecord};

static EPISODE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^S(\d{2})E(\d{2})$").expect("episode code pattern compiles"));

const SOURCE: &str = "subjects";

/// Header names that identify the episode rather than flag a subject.
fn is_identity_column(header: &str) -> bool {
    header.is_empty() || header.eq_ignore_ascii_case("EPISODE") || header.eq_ignore_ascii_case("TITLE")
}

pub fn parse_subject_table(input: impl AsRef<[u8]>) -> Result<Parsed<SubjectRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_ref());

    let headers = reader.headers()?.clone();
    let code_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("EPISODE"))
        .ok_or(Error::MissingColumn {
            table: SOURCE,
            column: "EPISODE",
        })?;

    let flag_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !is_identity_column(h))
        .map(|(i, h)| (i, h.to_uppercase()))
        .collect();

    let needed = flag_columns
        .iter()
        .map(|(i, _)| *i)
        .chain(std::iter::once(code_idx))
        .max()
        .map_or(0, |max| max + 1);

    let mut parsed = Parsed::new();

    for (row_idx, result) in reader.records().enumerate() {
        let fallback_line = row_idx + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map_or(fallback_line, |p| p.line() as usize);
                parsed.skip(SOURCE, line, SkipReason::Unreadable(e.to_string()));
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line() as usize);

        if record.len() < needed {
            parsed.skip(
                SOURCE,
                line,
                SkipReason::ShortRow {
                    found: record.len(),
                    needed,
                },
            );
            continue;
        }

        let code = &record[code_idx];
        let Some((season, episode)) = parse_episode_code(code) else {
            parsed.skip(SOURCE, line, SkipReason::EpisodeCode(code.to_string()));
            continue;
        };

        for (idx, subject) in &flag_columns {
            if &record[*idx] == "1" {
                parsed.records.push(SubjectRecord {
                    season,
                    episode,
                    subject: subject.clone(),
                });
            }
        }
    }

    Ok(parsed)
}

/// Splits a fixed-width `SxxEyy` code into (season, episode).
pub fn parse_episode_code(code: &str) -> Option<(i64, i64)> {
    let caps = EPISODE_CODE.captures(code.trim())?;
    let season = caps[1].parse().ok()?;
    let episode = caps[2].parse().ok()?;
    Some((season, episode))
}
