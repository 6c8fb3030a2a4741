//! Configuration file and term-table loading.
//!
//! Config is optional: a missing file means defaults. Lookup order is
//! `--config`, then `SUISHI_CONFIG`, then `$SUISHI_HOME/config.toml`
//! (home defaults to `~/.suishi`).

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use suishi_core::{RingGeometry, TermRecord, TermTable};

/// China Standard Time.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 480;
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_API_KEY_ENV: &str = "SUISHI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub utc_offset_minutes: i32,
    pub geometry: RingGeometry,
    pub insight: InsightConfig,
    pub table: TableConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            geometry: RingGeometry::default(),
            insight: InsightConfig::default(),
            table: TableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightConfig {
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl InsightConfig {
    /// API key from the configured environment variable; blank counts as unset.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    /// TOML file with a `[[terms]]` array replacing the built-in table.
    /// Relative paths resolve against the config file's directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    terms: Vec<TermRecord>,
}

impl Config {
    /// Load from the first config file found, or defaults if there is none.
    ///
    /// An explicit path must exist; the implicit locations may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        let candidate = env::var("SUISHI_CONFIG")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| suishi_home().join("config.toml"));
        if candidate.is_file() {
            let config = Self::from_file(&candidate)?;
            return Ok((config, Some(candidate)));
        }
        tracing::debug!("no config at {}, using defaults", candidate.display());
        Ok((Self::default(), None))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        if let Some(table) = &config.table.path
            && table.is_relative()
            && let Some(dir) = path.parent()
        {
            config.table.path = Some(dir.join(table));
        }
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// The configured term table, or the built-in one.
    pub fn load_table(&self) -> Result<TermTable> {
        match &self.table.path {
            Some(path) => load_table_file(path),
            None => Ok(TermTable::builtin()),
        }
    }
}

/// Parse a `[[terms]]` TOML table file. Any invalid record fails the load.
pub fn load_table_file(path: &Path) -> Result<TermTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read term table {}", path.display()))?;
    let file: TableFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse term table {}", path.display()))?;
    let table = TermTable::from_records(file.terms)
        .with_context(|| format!("invalid term table {}", path.display()))?;
    tracing::info!("loaded {} terms from {}", table.len(), path.display());
    Ok(table)
}

/// Base directory for suishi files.
/// Priority: SUISHI_HOME env > ~/.suishi
pub fn suishi_home() -> PathBuf {
    env::var("SUISHI_HOME")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(".suishi"))
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
