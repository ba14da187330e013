//! Core data models used throughout the catalog.
//!
//! These are the typed records the source parsers emit and the linker
//! consumes. Stored rows are read back into the response types of
//! [`crate::query`] and [`crate::metadata`].

use chrono::NaiveDate;
use tracing::warn;

use crate::error::{SkipReason, Skipped};

/// One line of the episode listing, with its positional season/episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub season: i64,
    pub episode: i64,
    pub title: String,
    pub air_date: NaiveDate,
}

/// A subject flagged for an episode in the subject table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRecord {
    pub season: i64,
    pub episode: i64,
    /// Canonical (upper-cased) subject name.
    pub subject: String,
}

/// One row of the color table: the pigments flagged for an episode and its
/// optional video link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRecord {
    pub season: i64,
    pub episode: i64,
    pub colors: Vec<&'static Pigment>,
    pub youtube_src: Option<String>,
}

/// A pigment column of the color table and the canonical color it maps to.
#[derive(Debug, PartialEq, Eq)]
pub struct Pigment {
    /// Column header in the color table.
    pub column: &'static str,
    /// Canonical display name.
    pub name: &'static str,
    pub hex_code: &'static str,
}

/// Output of a source parser: accepted records plus the lines it dropped.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Parsed<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Record a dropped line and log why it was dropped.
    pub fn skip(&mut self, source: &str, line: usize, reason: SkipReason) {
        warn!(source, line, %reason, "skipping record");
        self.skipped.push(Skipped { line, reason });
    }
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self::new()
    }
}
