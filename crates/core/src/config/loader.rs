use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::HuntConfig, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<HuntConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: HuntConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("HUNT_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<HuntConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[manager]
poll_interval_ms = 5000

[gateway]
base_url = "http://localhost:9000"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.manager.poll_interval_ms, 5000);
        assert_eq!(
            config.gateway.unwrap().base_url,
            "http://localhost:9000"
        );
    }

    #[test]
    fn test_load_config_gateway_without_base_url() {
        let toml = r#"
[gateway]
timeout_secs = 10
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[manager]
per_platform_delay_ms = 1000

[gateway]
base_url = "http://127.0.0.1:8000"
auth_token = "secret"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.manager.per_platform_delay_ms, 1000);
        let gateway = config.gateway.unwrap();
        assert_eq!(gateway.base_url, "http://127.0.0.1:8000");
        assert_eq!(gateway.auth_token.as_deref(), Some("secret"));
    }
}
