use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog API key is present
/// - Recommendation limits are non-zero
/// - Search debounce and display limit are non-zero
/// - Browse page size is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.catalog.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "catalog.api_key cannot be empty".to_string(),
        ));
    }

    let limits = [
        (
            "recommendations.favorites_limit",
            config.recommendations.favorites_limit,
        ),
        (
            "recommendations.watched_limit",
            config.recommendations.watched_limit,
        ),
        (
            "recommendations.search_terms_limit",
            config.recommendations.search_terms_limit,
        ),
        (
            "recommendations.search_results_limit",
            config.recommendations.search_results_limit,
        ),
        ("search.display_limit", config.search.display_limit),
        (
            "search.default_section_limit",
            config.search.default_section_limit,
        ),
        ("browse.genres_per_page", config.browse.genres_per_page),
    ];
    for (name, value) in limits {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    if config.search.debounce_ms == 0 {
        return Err(ConfigError::ValidationError(
            "search.debounce_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[catalog]
api_key = "key"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_blank_api_key_fails() {
        let mut config = valid_config();
        config.catalog.api_key = "   ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_limit_fails() {
        let mut config = valid_config();
        config.recommendations.search_terms_limit = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("search_terms_limit"));
    }

    #[test]
    fn test_validate_zero_debounce_fails() {
        let mut config = valid_config();
        config.search.debounce_ms = 0;
        assert!(validate_config(&config).is_err());
    }
}
