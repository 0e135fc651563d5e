//! Configuration module for Page-Lens
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All settings have defaults, so running without a file is supported.
//!
//! # Example
//!
//! ```no_run
//! use page_lens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("page-lens.toml")).unwrap();
//! println!("Probe concurrency: {}", config.analysis.probe_concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{AnalysisConfig, Config, ServerConfig, TranslationConfig, UserAgentConfig};

pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
