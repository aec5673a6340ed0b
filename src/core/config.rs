//! Configuration management for the Gnosis indexing service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! Every loaded configuration passes through [`Config::validate`]
//! before any index is opened.

use crate::core::error::{GnosisError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tokenizers registered by default on every tantivy index
pub const KNOWN_ANALYZERS: [&str; 4] = ["default", "raw", "en_stem", "whitespace"];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub indexes: Vec<IndexSection>,
}

/// Listener settings for the HTTP front end that serves the wiki
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Page size used when a request asks for zero results
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Upper bound on results per page
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Body preview length (characters) for fuzzy search results
    #[serde(default = "default_body_preview_chars")]
    pub body_preview_chars: usize,

    /// Levenshtein distance for fuzzy term matching
    #[serde(default = "default_fuzzy_distance")]
    pub fuzzy_distance: u8,
}

/// One configured search index and the directories that feed it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexSection {
    /// Unique index name
    pub name: String,

    /// On-disk index directory (defaults to the XDG data dir)
    #[serde(default)]
    pub index_path: PathBuf,

    /// Tokenizer used for title and body
    #[serde(default = "default_index_type")]
    pub index_type: String,

    /// Filesystem root -> URI prefix
    #[serde(default)]
    pub watch_dirs: BTreeMap<String, String>,

    /// Only files ending with this suffix are indexed
    #[serde(default = "default_watch_extension")]
    pub watch_extension: String,

    /// Pages carrying any of these topics are kept out of the index
    #[serde(default)]
    pub restricted: Vec<String>,

    /// Quiet period before queued file events are applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    1000
}

fn default_body_preview_chars() -> usize {
    480
}

fn default_fuzzy_distance() -> u8 {
    1
}

fn default_index_type() -> String {
    "en_stem".to_string()
}

fn default_watch_extension() -> String {
    ".md".to_string()
}

fn default_debounce_ms() -> u64 {
    10_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            body_preview_chars: default_body_preview_chars(),
            fuzzy_distance: default_fuzzy_distance(),
        }
    }
}

impl IndexSection {
    /// Create a section with default settings
    pub fn new(name: impl Into<String>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            index_path: index_path.into(),
            index_type: default_index_type(),
            watch_dirs: BTreeMap::new(),
            watch_extension: default_watch_extension(),
            restricted: Vec::new(),
            debounce_ms: default_debounce_ms(),
        }
    }

    /// Add a watched root served under `uri_prefix`
    pub fn watch(mut self, root: impl AsRef<Path>, uri_prefix: impl Into<String>) -> Self {
        self.watch_dirs.insert(
            root.as_ref().to_string_lossy().into_owned(),
            uri_prefix.into(),
        );
        self
    }

    /// Debounce interval as a `Duration`
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GnosisError::ConfigError(
                "Index name must not be empty".to_string(),
            ));
        }

        if self.index_path.as_os_str().is_empty() {
            return Err(GnosisError::ConfigError(format!(
                "Index '{}' has no index_path",
                self.name
            )));
        }

        if !KNOWN_ANALYZERS.contains(&self.index_type.as_str()) {
            return Err(GnosisError::ConfigError(format!(
                "Index '{}' uses unknown index_type '{}' (expected one of: {})",
                self.name,
                self.index_type,
                KNOWN_ANALYZERS.join(", ")
            )));
        }

        if self.watch_extension.is_empty() {
            return Err(GnosisError::ConfigError(format!(
                "Index '{}' must set a non-empty watch_extension",
                self.name
            )));
        }

        if self.debounce_ms == 0 {
            return Err(GnosisError::ConfigError(format!(
                "Index '{}' debounce_ms must be non-zero",
                self.name
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| GnosisError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// This method uses XDG Base Directory specification for file locations.
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. GNOSIS_CONFIG env var
    /// 2. XDG config file (~/.config/gnosis/config.toml)
    /// 3. ./gnosis.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("GNOSIS_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("gnosis.toml").exists() {
                Self::from_file("gnosis.toml")?
            } else {
                Self::default()
            }
        };

        config.resolve_paths(xdg);
        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Load an explicit file, then apply env overrides and validation
    pub fn load_from(path: impl AsRef<Path>, xdg: &XdgDirs) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.resolve_paths(xdg);
        config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Fill in index paths left empty in the file
    pub fn resolve_paths(&mut self, xdg: &XdgDirs) {
        for section in &mut self.indexes {
            if section.index_path.as_os_str().is_empty() && !section.name.is_empty() {
                section.index_path = xdg.index_dir(&section.name);
            }
        }
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(host) = env::var("GNOSIS_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("GNOSIS_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Search configuration
        if let Ok(page_size) = env::var("GNOSIS_DEFAULT_PAGE_SIZE") {
            if let Ok(size) = page_size.parse() {
                self.search.default_page_size = size;
            }
        }
        if let Ok(max_page_size) = env::var("GNOSIS_MAX_PAGE_SIZE") {
            if let Ok(size) = max_page_size.parse() {
                self.search.max_page_size = size;
            }
        }
        if let Ok(preview) = env::var("GNOSIS_BODY_PREVIEW_CHARS") {
            if let Ok(chars) = preview.parse() {
                self.search.body_preview_chars = chars;
            }
        }
        if let Ok(distance) = env::var("GNOSIS_FUZZY_DISTANCE") {
            if let Ok(d) = distance.parse() {
                self.search.fuzzy_distance = d;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.search.default_page_size == 0 {
            return Err(GnosisError::ConfigError(
                "Default page size must be non-zero".to_string(),
            ));
        }

        if self.search.default_page_size > self.search.max_page_size {
            return Err(GnosisError::ConfigError(
                "Default page size cannot exceed max page size".to_string(),
            ));
        }

        if self.search.body_preview_chars == 0 {
            return Err(GnosisError::ConfigError(
                "Body preview length must be non-zero".to_string(),
            ));
        }

        // tantivy's automaton builder stops at distance 2
        if self.search.fuzzy_distance > 2 {
            return Err(GnosisError::ConfigError(
                "Fuzzy distance must be 0, 1 or 2".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for section in &self.indexes {
            section.validate()?;
            if !names.insert(section.name.as_str()) {
                return Err(GnosisError::ConfigError(format!(
                    "Duplicate index name '{}'",
                    section.name
                )));
            }
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen: {}:{}", self.server.host, self.server.port);
        tracing::info!("  Default page size: {}", self.search.default_page_size);
        tracing::info!("  Max page size: {}", self.search.max_page_size);
        tracing::info!(
            "  Body preview: {} chars",
            self.search.body_preview_chars
        );
        tracing::info!("  Fuzzy distance: {}", self.search.fuzzy_distance);
        for section in &self.indexes {
            tracing::info!(
                "  Index '{}': {:?} ({}), {} watched dirs, {} restricted topics",
                section.name,
                section.index_path,
                section.index_type,
                section.watch_dirs.len(),
                section.restricted.len()
            );
        }
    }
}
