//! Application configuration for SiteSearch.
//!
//! User config lives at `~/.sitesearch/sitesearch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteSearchError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitesearch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitesearch";

// ---------------------------------------------------------------------------
// Config structs (matching sitesearch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Crawl policies.
    #[serde(default)]
    pub crawl_policies: CrawlPoliciesConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Output destination for the JSONL abstracts (`-` for stdout).
    #[serde(default = "default_output")]
    pub output: String,

    /// Number of pages fetched concurrently.
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            workers: default_workers(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_output() -> String {
    "abstracts.jsonl".into()
}
fn default_workers() -> u32 {
    10
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[crawl_policies]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPoliciesConfig {
    /// URL path include patterns.
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// URL path exclude patterns.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Delay in ms before each page request.
    #[serde(default)]
    pub rate_limit_ms: u64,

    /// How many levels of nested sitemap indexes to follow.
    #[serde(default = "default_max_sitemap_depth")]
    pub max_sitemap_depth: u32,
}

impl Default for CrawlPoliciesConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            rate_limit_ms: 0,
            max_sitemap_depth: default_max_sitemap_depth(),
        }
    }
}

fn default_max_sitemap_depth() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Crawl config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime crawl configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Maximum concurrent page fetches.
    pub workers: u32,
    /// HTTP timeout per request in seconds.
    pub timeout_secs: u64,
    /// URL include glob patterns.
    pub include_patterns: Vec<String>,
    /// URL exclude glob patterns.
    pub exclude_patterns: Vec<String>,
    /// Delay in ms before each page request.
    pub rate_limit_ms: u64,
    /// Maximum sitemap index nesting.
    pub max_sitemap_depth: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            workers: config.defaults.workers,
            timeout_secs: config.defaults.timeout_secs,
            include_patterns: config.crawl_policies.include_patterns.clone(),
            exclude_patterns: config.crawl_policies.exclude_patterns.clone(),
            rate_limit_ms: config.crawl_policies.rate_limit_ms,
            max_sitemap_depth: config.crawl_policies.max_sitemap_depth,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitesearch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteSearchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitesearch/sitesearch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteSearchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteSearchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteSearchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteSearchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteSearchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("workers"));
        assert!(toml_str.contains("abstracts.jsonl"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
workers = 3

[crawl_policies]
exclude_patterns = ["/blog/**"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.workers, 3);
        assert_eq!(config.defaults.output, "abstracts.jsonl");
        assert_eq!(config.crawl_policies.exclude_patterns, vec!["/blog/**"]);
        assert_eq!(config.crawl_policies.max_sitemap_depth, 10);
    }

    #[test]
    fn crawl_config_from_app_config() {
        let crawl = CrawlConfig::default();
        assert_eq!(crawl.workers, 10);
        assert_eq!(crawl.timeout_secs, 30);
        assert_eq!(crawl.rate_limit_ms, 0);
        assert!(crawl.include_patterns.is_empty());
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[defaults]\noutput = \"-\"\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.output, "-");
        assert_eq!(config.defaults.workers, 10);
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[defaults\nworkers = ").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
