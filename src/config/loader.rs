//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedirectMode;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:8080"

            [route]
            public_host = "public.example"
            reserved_prefix = "/blog"
            upstream_authority = "upstream.example"
            default_origin = "origin.example"
            redirect_mode = "follow"
            cache_exclusions = ["/ghost/", "preview="]
        "#;
        let config: ProxyConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.route.public_host, "public.example");
        assert_eq!(config.route.redirect_mode, RedirectMode::Follow);
        assert_eq!(config.route.cache_exclusions.len(), 2);
        assert!(validate_config(&config).is_ok());
    }
}
