use crate::config::types::{AnalysisConfig, Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    validate_analysis_config(&config.analysis)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 {
        return Err(ConfigError::Validation(format!(
            "workers must be >= 1, got {}",
            config.workers
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    validate_name("start", &config.start)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.prefixes.is_empty() {
        return Err(ConfigError::Validation(
            "at least one address prefix is required".to_string(),
        ));
    }

    if let Some(empty) = config.prefixes.iter().position(|p| p.is_empty()) {
        return Err(ConfigError::Validation(format!(
            "prefix #{} cannot be empty",
            empty
        )));
    }

    // The canonical prefix is used to build fetchable URLs
    if !config.prefixes[0].starts_with("http") {
        return Err(ConfigError::Validation(format!(
            "the first prefix must be absolute, got '{}'",
            config.prefixes[0]
        )));
    }

    if config.query_marker.is_empty() {
        return Err(ConfigError::Validation(
            "query_marker cannot be empty".to_string(),
        ));
    }

    validate_name("content_id", &config.content_id)?;
    validate_name("link_class", &config.link_class)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.edge_log.is_empty() {
        return Err(ConfigError::Validation(
            "edge_log cannot be empty".to_string(),
        ));
    }

    for (key, path) in [("rank_file", &config.rank_file), ("csv_file", &config.csv_file)] {
        if matches!(path, Some(p) if p.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty when given",
                key
            )));
        }
    }

    Ok(())
}

/// Validates PageRank parameters
fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.reset_probability) {
        return Err(ConfigError::Validation(format!(
            "reset_probability must be between 0 and 1, got {}",
            config.reset_probability
        )));
    }

    if config.steps_per_iteration < 1 {
        return Err(ConfigError::Validation(
            "steps_per_iteration must be >= 1".to_string(),
        ));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_iterations must be >= 1".to_string(),
        ));
    }

    config.convergence.policy()?;

    Ok(())
}

/// Rejects empty values and values containing whitespace
fn validate_name(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
    }

    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{} cannot contain whitespace, got '{}'",
            key, value
        )));
    }

    Ok(())
}
