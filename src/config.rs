use serde::Deserialize;

use crate::errors::ConfigError;

pub const PRODUCTION_KEY_ENV: &str = "NREL_API_KEY";
pub const ADVISORY_KEY_ENV: &str = "GEMINI_API_KEY";

fn default_offline_mode() -> bool { false }
fn default_port() -> u16 { 8080 }
fn default_production_url() -> String { "https://developer.nrel.gov/api/pvwatts/v8.json".to_string() }
fn default_production_timeout() -> u64 { 10 }
fn default_advisory_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_advisory_model() -> String { "gemini-pro".to_string() }
fn default_advisory_timeout() -> u64 { 15 }
fn default_geocoding_url() -> String { "https://nominatim.openstreetmap.org".to_string() }
fn default_user_agent() -> String { "SolarSensei/0.1".to_string() }
fn default_geocoding_timeout() -> u64 { 5 }

/// Process-wide configuration. Loaded once at startup and read-only afterwards.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// When set, production figures come from the offline simulation instead of PVWatts.
    #[serde(default = "default_offline_mode")]
    pub offline_mode: bool,
    #[serde(default)]
    pub production: ProductionConfig,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductionConfig {
    #[serde(default = "default_production_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_production_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            base_url: default_production_url(),
            api_key: None,
            timeout_secs: default_production_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisoryConfig {
    #[serde(default = "default_advisory_url")]
    pub base_url: String,
    #[serde(default = "default_advisory_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_advisory_timeout")]
    pub timeout_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_advisory_url(),
            model: default_advisory_model(),
            api_key: None,
            timeout_secs: default_advisory_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_geocoding_timeout(),
        }
    }
}

impl Config {
    /// Reads the JSON config file and layers credentials from the environment on top.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config.with_credentials(
            std::env::var(PRODUCTION_KEY_ENV).ok(),
            std::env::var(ADVISORY_KEY_ENV).ok(),
        ))
    }

    /// Environment credentials win over the file; blank values count as absent.
    pub fn with_credentials(mut self, production_key: Option<String>, advisory_key: Option<String>) -> Self {
        if let Some(key) = non_blank(production_key) {
            self.production.api_key = Some(key);
        }
        if let Some(key) = non_blank(advisory_key) {
            self.advisory.api_key = Some(key);
        }
        self.production.api_key = non_blank(self.production.api_key.take());
        self.advisory.api_key = non_blank(self.advisory.api_key.take());
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(!config.offline_mode);
        assert_eq!(config.production.timeout_secs, 10);
        assert_eq!(config.geocoding.timeout_secs, 5);
        assert!(config.production.api_key.is_none());
    }

    #[test]
    fn environment_credentials_override_file() {
        let config: Config = serde_json::from_str(
            r#"{ "offline_mode": true, "production": { "api_key": "from-file" } }"#,
        ).unwrap();
        let config = config.with_credentials(Some("from-env".to_string()), None);

        assert!(config.offline_mode);
        assert_eq!(config.production.api_key.as_deref(), Some("from-env"));
        assert!(config.advisory.api_key.is_none());
    }

    #[test]
    fn blank_credentials_are_absent() {
        let config: Config = serde_json::from_str(r#"{ "advisory": { "api_key": "  " } }"#).unwrap();
        let config = config.with_credentials(Some(String::new()), None);

        assert!(config.production.api_key.is_none());
        assert!(config.advisory.api_key.is_none());
    }
}
