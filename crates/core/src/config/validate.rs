use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration.
///
/// Checks that the server port is usable, that the app secret exists when
/// secret auth is selected, and that both remote APIs have credentials.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::AppSecret
        && config.auth.app_secret.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.app_secret must be set when auth.method = \"app_secret\"".to_string(),
        ));
    }

    let required = [
        ("helpdesk.domain", &config.helpdesk.domain),
        ("helpdesk.api_key", &config.helpdesk.api_key),
        ("signing.token_api", &config.signing.token_api),
        ("signing.crypt_key", &config.signing.crypt_key),
        ("signing.safe_uuid", &config.signing.safe_uuid),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn base_toml() -> String {
        r#"
[auth]
method = "none"

[helpdesk]
domain = "acme.freshservice.com"
api_key = "hd-key"

[signing]
token_api = "token"
crypt_key = "crypt"
safe_uuid = "safe"
"#
        .to_string()
    }

    #[test]
    fn test_validate_valid_config() {
        let config = load_config_from_str(&base_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = load_config_from_str(&base_toml()).unwrap();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_app_secret_required() {
        let mut config = load_config_from_str(&base_toml()).unwrap();
        config.auth.method = AuthMethod::AppSecret;
        config.auth.app_secret = None;
        assert!(validate_config(&config).is_err());

        config.auth.app_secret = Some("s3cret".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_credentials_fail() {
        let mut config = load_config_from_str(&base_toml()).unwrap();
        config.signing.crypt_key = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("signing.crypt_key"));
    }
}
