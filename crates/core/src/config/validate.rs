use super::{types::Config, ConfigError};
use crate::config::LlmProvider;

/// Validate configuration
/// Currently validates:
/// - LLM section exists (enforced by serde)
/// - Server port is not 0
/// - Database path is not empty
/// - Anthropic requires an API key
/// - Token, temperature and delay bounds
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty".to_string(),
        ));
    }

    // LLM validation
    if config.llm.provider == LlmProvider::Anthropic
        && config.llm.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "llm.api_key is required when llm.provider is anthropic".to_string(),
        ));
    }

    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "llm.max_tokens must be at least 1".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        return Err(ConfigError::ValidationError(
            "llm.temperature must be between 0.0 and 2.0".to_string(),
        ));
    }

    if config.llm.request_delay_secs < 0.0 {
        return Err(ConfigError::ValidationError(
            "llm.request_delay_secs cannot be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn ollama_config() -> Config {
        load_config_from_str(
            r#"
[llm]
provider = "ollama"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_validate_valid_config() {
        let config = ollama_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = ollama_config();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_anthropic_without_key_fails() {
        let config = load_config_from_str(
            r#"
[llm]
provider = "anthropic"
"#,
        )
        .unwrap();
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("llm.api_key is required"));
    }

    #[test]
    fn test_validate_anthropic_with_key_ok() {
        let config = load_config_from_str(
            r#"
[llm]
provider = "anthropic"
api_key = "sk-test"
"#,
        )
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_temperature_out_of_range_fails() {
        let mut config = ollama_config();
        config.llm.temperature = 2.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_negative_delay_fails() {
        let mut config = ollama_config();
        config.llm.request_delay_secs = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_max_tokens_fails() {
        let mut config = ollama_config();
        config.llm.max_tokens = 0;
        assert!(validate_config(&config).is_err());
    }
}
