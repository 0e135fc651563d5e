//! Page-Lens: structural analysis of a single web page
//!
//! This crate extracts metadata, headings and links from an HTML document,
//! decides whether the page shows a login form, and optionally probes every
//! discovered link for reachability in the background. Deferred probe results
//! are held in an in-process cache until a follow-up lookup collects them.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod server;
pub mod source;
pub mod translation;
pub mod url;

use thiserror::Error;

/// Main error type for Page-Lens operations
#[derive(Debug, Error)]
pub enum LensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Deferred analysis failed: {0}")]
    Deferred(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to resolve '{href}': {source}")]
    InvalidUrl {
        href: String,
        source: ::url::ParseError,
    },

    #[error("Invalid source page URL '{url}': {source}")]
    InvalidSource {
        url: String,
        source: ::url::ParseError,
    },
}

/// Result type alias for Page-Lens operations
pub type Result<T> = std::result::Result<T, LensError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, PageAnalyzer, WebPageData};
pub use cache::{CacheEntry, DeferredCache};
pub use config::Config;
pub use crate::url::{classify_hrefs, resolve_absolute_url, HrefData};
