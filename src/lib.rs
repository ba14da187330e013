//! # Canvas Catalog
//!
//! An ingestion and query service for a televised painting show's episode
//! catalog.
//!
//! Three raw inputs (a free-text episode listing, a subject flag table, and a
//! pigment flag table) are parsed, reconciled, and written into a normalized
//! SQLite model. Episodes can then be filtered by subject, color, and air
//! month, combining values within a dimension with `AND` or `OR`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Source files │──▶│ Parse + Link │──▶│  SQLite   │
//! │ txt/csv/csv  │   │  classifier  │   │ 5 tables  │
//! └──────────────┘   └──────────────┘   └────┬─────┘
//!                                            │
//!                        ┌───────────────────┤
//!                        ▼                   ▼
//!                   ┌──────────┐       ┌──────────┐
//!                   │   CLI    │       │   HTTP   │
//!                   │ (canvas) │       │  (/api)  │
//!                   └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! canvas init                                   # create database, seed subjects and colors
//! canvas ingest                                 # load the three source files
//! canvas query --subject TREE --subject MOUNTAIN --mode OR
//! canvas serve                                  # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error and skip-reason types |
//! | [`models`] | Parsed record types |
//! | [`classify`] | Subject category tables |
//! | [`source_listing`] | Episode listing parser |
//! | [`source_subjects`] | Subject flag table parser |
//! | [`source_colors`] | Color flag table parser and pigment palette |
//! | [`link`] | Normalizer/linker (idempotent writes) |
//! | [`ingest`] | Transactional ingestion pipeline |
//! | [`filter`] | Filter normalization and SQL composition |
//! | [`query`] | Filtered episode retrieval |
//! | [`metadata`] | Filter option listing |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations and seeding |

pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod link;
pub mod metadata;
pub mod migrate;
pub mod models;
pub mod query;
pub mod server;
pub mod source_colors;
pub mod source_listing;
pub mod source_subjects;
pub mod sources;
pub mod stats;
