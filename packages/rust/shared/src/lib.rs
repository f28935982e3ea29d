//! Shared types, error model, and configuration for SiteSearch.
//!
//! This crate is the foundation depended on by all other SiteSearch crates.
//! It provides:
//! - [`SiteSearchError`]: the unified error type
//! - Domain types ([`PageFragment`], [`FragmentTag`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlPoliciesConfig, DefaultsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{Result, SiteSearchError};
pub use types::{FragmentTag, PageFragment};
