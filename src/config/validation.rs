use crate::config::types::{
    AnalysisConfig, Config, ServerConfig, TranslationConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrent reachability probes
const MAX_PROBE_CONCURRENCY: u32 = 512;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_analysis_config(&config.analysis)?;
    validate_translation_config(&config.translation)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if let Some(base) = &config.public_base_url {
        let url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid public-base-url: {}", e)))?;
        validate_http_scheme(&url, "public-base-url")?;
    }

    Ok(())
}

fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if config.probe_concurrency < 1 || config.probe_concurrency > MAX_PROBE_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "probe-concurrency must be between 1 and {}, got {}",
            MAX_PROBE_CONCURRENCY, config.probe_concurrency
        )));
    }

    if config.probe_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "probe-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.cache_lifespan_secs < 1 {
        return Err(ConfigError::Validation(
            "cache-lifespan-secs must be >= 1".to_string(),
        ));
    }

    if config
        .elective_keywords
        .iter()
        .any(|keyword| keyword.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "elective-keywords cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_translation_config(config: &TranslationConfig) -> Result<(), ConfigError> {
    if config.memo_capacity < 1 {
        return Err(ConfigError::Validation(
            "memo-capacity must be >= 1".to_string(),
        ));
    }

    if config.source_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "source-language cannot be empty".to_string(),
        ));
    }

    // The endpoint only matters when translation is switched on
    if config.enabled {
        let url = Url::parse(&config.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;
        validate_http_scheme(&url, "endpoint")?;
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agent_name.is_empty() {
        return Err(ConfigError::Validation(
            "agent-name cannot be empty".to_string(),
        ));
    }

    if !config
        .agent_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "agent-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.agent_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

fn validate_http_scheme(url: &Url, field: &str) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}
