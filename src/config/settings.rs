//! Settings structures for Domain Discovery configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main settings structure matching settings.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub search: SearchSettings,
    pub oracle: OracleSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables (DOMAIN_DISCOVERY_* prefix)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_STORAGE_PATH") {
            self.storage.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_ORACLE_BACKEND") {
            self.oracle.backend = val;
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_ORACLE_ENDPOINT") {
            self.oracle.endpoint = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.oracle.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DOMAIN_DISCOVERY_ORACLE_API_KEY") {
            self.oracle.api_key = Some(val);
        }
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
    /// Instance name reported by the API
    pub instance_name: String,
    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            debug: false,
            instance_name: "Domain Discovery".to_string(),
            enable_metrics: true,
        }
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8787,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

/// Record storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON file holding the domain collection
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("domain-discovery")
                .join("domains.json"),
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Maximum number of suggestions returned
    pub suggestion_limit: usize,
    /// Minimum trimmed query length for suggestions
    pub min_suggestion_chars: usize,
    /// Queries longer than this are enriched by the oracle
    pub enrichment_min_chars: usize,
    /// Direct matching runs when fewer results than this remain
    pub direct_match_threshold: usize,
    /// Maximum ids accepted from a direct match
    pub direct_match_limit: usize,
    /// Optional YAML lexicon replacing the built-in tables
    pub lexicon_path: Option<PathBuf>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            suggestion_limit: 5,
            min_suggestion_chars: 2,
            enrichment_min_chars: 3,
            direct_match_threshold: 2,
            direct_match_limit: 5,
            lexicon_path: None,
        }
    }
}

/// Oracle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// Backend name: none, http or openai
    pub backend: String,
    /// Endpoint URL (base URL for http, chat completions URL for openai)
    pub endpoint: String,
    /// Model name for chat backends
    pub model: String,
    /// API key, never written back out
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Sampling temperature for chat backends
    pub temperature: f32,
    /// Completion token limit for chat backends
    pub max_tokens: u32,
    /// Oracle calls allowed per minute (0 = unlimited)
    pub requests_per_minute: u32,
    /// Seconds successful replies stay cached (0 = no cache)
    pub cache_ttl: u64,
    /// Maximum cached replies
    pub cache_capacity: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            backend: "none".to_string(),
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            temperature: 0.3,
            max_tokens: 150,
            requests_per_minute: 0,
            cache_ttl: 300,
            cache_capacity: 1000,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            pool_maxsize: 4,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8787);
        assert!(!settings.general.debug);
        assert_eq!(settings.oracle.backend, "none");
        assert_eq!(settings.search.suggestion_limit, 5);
        assert!(settings.storage.path.ends_with("domains.json"));
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
server:
  port: 9000
oracle:
  backend: http
  endpoint: http://localhost:7000
  api_key: secret
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.bind_address, "127.0.0.1");
        assert_eq!(settings.oracle.backend, "http");
        assert_eq!(settings.oracle.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.oracle.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut settings = Settings::default();
        settings.oracle.api_key = Some("secret".to_string());
        let yaml = serde_yaml::to_string(&settings).unwrap();
        assert!(!yaml.contains("secret"));
    }
}
