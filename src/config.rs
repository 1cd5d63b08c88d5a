use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Where and how to reach the usage service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token; the environment variable wins over this when both are
    /// set.
    pub token: Option<String>,
    pub origin: Option<String>,
    pub parent_origin: Option<String>,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            origin: None,
            parent_origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    /// User filter applied when the command line gives none.
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub defaults: Defaults,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("chatmeter").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let api_url = self.service.api_url.trim();
        if api_url.is_empty() {
            issues.push("api_url is empty".to_string());
        } else if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            issues.push(format!(
                "Invalid api_url: '{}' (must start with http:// or https://)",
                api_url
            ));
        }
        if let Some(token) = &self.service.token {
            if token.trim().is_empty() {
                issues.push("Token is set but empty".to_string());
            }
        }
        if let Some(user) = &self.defaults.user {
            if user.trim().is_empty() {
                issues.push("Default user is set but empty".to_string());
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_api_url_is_local() {
        let config = AppConfig::default();
        assert_eq!(config.service.api_url, "http://localhost:8000");
        assert!(config.service.token.is_none());
        assert!(config.defaults.user.is_none());
    }

    #[test]
    fn validate_catches_bad_scheme() {
        let mut config = AppConfig::default();
        config.service.api_url = "ftp://assistant.example.com".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("api_url")));
    }

    #[test]
    fn validate_catches_empty_api_url() {
        let mut config = AppConfig::default();
        config.service.api_url = "  ".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("api_url is empty")));
    }

    #[test]
    fn validate_catches_empty_token() {
        let mut config = AppConfig::default();
        config.service.token = Some("".to_string());
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("Token")));
    }

    #[test]
    fn validate_catches_empty_default_user() {
        let mut config = AppConfig::default();
        config.defaults.user = Some("   ".to_string());
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("Default user")));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[service]
api_url = "https://assistant.example.com"
token = "secret"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.service.api_url, "https://assistant.example.com");
        assert_eq!(config.service.token.as_deref(), Some("secret"));
        assert!(config.service.origin.is_none());
    }

    #[test]
    fn parse_defaults_section() {
        let toml = r#"
[defaults]
user = "user-42"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.user.as_deref(), Some("user-42"));
        assert_eq!(config.service.api_url, "http://localhost:8000");
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.service.api_url, "http://localhost:8000");
        assert!(config.defaults.user.is_none());
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_xdg_config/chatmeter/config.toml")
        );
    }
}
