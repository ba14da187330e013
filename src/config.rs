use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Locations of the three raw input files.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Free-text listing: one `"<title>" (<Month> <Day>, <Year>)` per line.
    pub episodes: PathBuf,
    /// Subject flag table keyed by an `EPISODE` code column.
    pub subjects: PathBuf,
    /// Pigment flag table with `season` / `episode` columns.
    pub colors: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_season_size")]
    pub season_size: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            season_size: default_season_size(),
        }
    }
}

fn default_season_size() -> u32 {
    13
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.ingest.season_size == 0 {
        anyhow::bail!("ingest.season_size must be > 0");
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}
