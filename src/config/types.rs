use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Page-Lens
///
/// Every section is optional; missing keys fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub translation: TranslationConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// HTTP service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Base URL advertised in deferred-result links (e.g. "https://lens.example.com").
    /// When absent the request's Host header is used.
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3003,
            public_base_url: None,
        }
    }
}

/// Page analysis behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Maximum number of reachability probes in flight at once
    pub probe_concurrency: u32,

    /// Timeout for a single probe or page fetch (seconds)
    pub probe_timeout_secs: u64,

    /// How long a deferred result stays retrievable (seconds)
    pub cache_lifespan_secs: u64,

    /// Extra login keywords merged with the built-in list
    pub elective_keywords: Vec<String>,
}

impl AnalysisConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn cache_lifespan(&self) -> Duration {
        Duration::from_secs(self.cache_lifespan_secs)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            probe_concurrency: 32,
            probe_timeout_secs: 30,
            cache_lifespan_secs: 30 * 60,
            elective_keywords: Vec::new(),
        }
    }
}

/// Keyword translation service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TranslationConfig {
    /// When false, keywords are matched in their original form only
    pub enabled: bool,

    /// LibreTranslate-compatible endpoint
    pub endpoint: String,

    /// Language the keyword list is written in
    pub source_language: String,

    /// Maximum number of memoised translations
    pub memo_capacity: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://libretranslate.de/translate".to_string(),
            source_language: "en".to_string(),
            memo_capacity: 4096,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the agent
    pub agent_name: String,

    /// Version of the agent
    pub agent_version: String,

    /// URL with information about the agent
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.agent_name, self.agent_version, self.contact_url
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agent_name: "PageLens".to_string(),
            agent_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/page-lens/page-lens".to_string(),
        }
    }
}
