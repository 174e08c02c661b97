//! Persistence configuration.

use serde::{Deserialize, Serialize};

/// Remote endpoint used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api/canvas";
/// Design name used when a command does not name one.
pub const DEFAULT_NAME: &str = "myCanvas";

/// Where designs go and what they are called by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Base URL of the remote store; `/save` and `/get/{name}` hang off it.
    #[serde(alias = "baseUrl")]
    pub base_url: String,
    #[serde(alias = "defaultName")]
    pub default_name: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Read `EASEL_BASE_URL` and `EASEL_DEFAULT_NAME`, falling back to the
    /// defaults for unset or blank values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            base_url: read("EASEL_BASE_URL", DEFAULT_BASE_URL),
            default_name: read("EASEL_DEFAULT_NAME", DEFAULT_NAME),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = PersistenceConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api/canvas");
        assert_eq!(config.default_name, "myCanvas");
    }

    #[test]
    fn test_lookup_overrides_and_blank_fallback() {
        let vars: HashMap<&str, &str> = [
            ("EASEL_BASE_URL", "https://example.test/api/canvas"),
            ("EASEL_DEFAULT_NAME", "  "),
        ]
        .into_iter()
        .collect();
        let config = PersistenceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.base_url, "https://example.test/api/canvas");
        assert_eq!(config.default_name, DEFAULT_NAME);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: PersistenceConfig =
            serde_json::from_str(r#"{"baseUrl":"http://h/api","defaultName":"poster"}"#).unwrap();
        assert_eq!(config.base_url, "http://h/api");
        assert_eq!(config.default_name, "poster");

        let partial: PersistenceConfig = serde_json::from_str(r#"{"default_name":"x"}"#).unwrap();
        assert_eq!(partial.base_url, DEFAULT_BASE_URL);
    }
}
