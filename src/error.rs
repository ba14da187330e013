//! Error types for the catalog.
//!
//! [`Error`] covers failures that end an operation: unreadable inputs, a
//! storage failure during an ingestion batch (the batch is rolled back), or a
//! storage failure during retrieval. [`SkipReason`] describes a single record
//! that was dropped while the rest of the batch carried on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tabular input lacks a column the parser cannot do without.
    #[error("{table} table is missing required column `{column}`")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    /// The header row of a tabular input could not be read.
    #[error("unreadable CSV header: {0}")]
    Csv(#[from] csv::Error),

    /// Storage failure during an ingestion batch. Nothing was committed.
    #[error("ingestion failed, batch rolled back: {0}")]
    Ingestion(#[source] sqlx::Error),

    /// Storage failure while retrieving episodes or filter metadata.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single input record was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("line does not match `\"<title>\" (<Month> <Day>, <Year>)`")]
    ListingShape,

    #[error("unparseable air date `{0}`")]
    AirDate(String),

    #[error("row has {found} columns, needs at least {needed}")]
    ShortRow { found: usize, needed: usize },

    #[error("malformed episode code `{0}`")]
    EpisodeCode(String),

    #[error("{column} value `{value}` is not an integer")]
    NotInteger { column: &'static str, value: String },

    #[error("line is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("unreadable row: {0}")]
    Unreadable(String),

    #[error("no episode S{season:02}E{episode:02} in the catalog")]
    UnknownEpisode { season: i64, episode: i64 },
}

/// A dropped record and where it was found (1-based line number).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub line: usize,
    pub reason: SkipReason,
}
