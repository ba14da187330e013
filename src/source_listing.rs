//! Episode-listing parser.
//!
//! Each line of the listing reads `"<title>" (<Month> <Day>, <Year>)`.
//! Seasons and episodes are numbered from the position of the line among
//! the accepted ones, `season_size` episodes per season.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SkipReason;
use crate::models::{ListingRecord, Parsed};

static LISTING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"([^"]+)" \(([^)]+)\)"#).expect("listing pattern compiles"));

const SOURCE: &str = "episodes";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse the listing. Lines are decoded one at a time, so a line that is
/// not valid UTF-8 is skipped without losing the rest of the file.
pub fn parse_listing(input: impl AsRef<[u8]>, season_size: u32) -> Parsed<ListingRecord> {
    let season_size = i64::from(season_size.max(1));
    let bytes = input.as_ref();
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut parsed = Parsed::new();

    for (idx, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let raw = match std::str::from_utf8(raw) {
            Ok(raw) => raw,
            Err(e) => {
                parsed.skip(SOURCE, idx + 1, SkipReason::Encoding(e.to_string()));
                continue;
            }
        };
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (title, air_date) = match parse_line(line) {
            Ok(fields) => fields,
            Err(reason) => {
                parsed.skip(SOURCE, idx + 1, reason);
                continue;
            }
        };

        let position = parsed.records.len() as i64;
        parsed.records.push(ListingRecord {
            season: position / season_size + 1,
            episode: position % season_size + 1,
            title,
            air_date,
        });
    }

    parsed
}

fn parse_line(line: &str) -> Result<(String, NaiveDate), SkipReason> {
    let caps = LISTING_LINE
        .captures(line)
        .ok_or(SkipReason::ListingShape)?;

    let title = caps[1].to_string();
    let date_str = caps[2].trim();
    let air_date = NaiveDate::parse_from_str(date_str, "%B %d, %Y")
        .map_err(|_| SkipReason::AirDate(date_str.to_string()))?;

    Ok((title, air_date))
}
