//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::content::Resource;

/// Root configuration for the vanity filter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Vanity root path declarations.
    pub vanity: VanityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Resources served by the built-in content repository.
    pub content: Vec<Resource>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Vanity routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VanityConfig {
    /// Root path declarations, each `prefix` or `prefix=target1,target2`.
    ///
    /// `None` (key absent) disables vanity routing entirely.
    pub root_paths: Option<Vec<String>>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: FilterConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.vanity.root_paths.is_none());
        assert!(config.content.is_empty());
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_full_document() {
        let config: FilterConfig = toml::from_str(
            r#"
            [vanity]
            root_paths = ["/content/site/", "/content/fr/=/content/fr/,/content/media/"]

            [[content]]
            path = "/MyVanity"
            resource_type = "sling:redirect"
            [content.attributes]
            "sling:target" = "/content/site/page"

            [[content]]
            path = "/content/site/page"
            resource_type = "page"
            "#,
        )
        .unwrap();

        assert_eq!(config.vanity.root_paths.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.content.len(), 2);
        assert_eq!(config.content[0].target(), Some("/content/site/page"));
    }

    #[test]
    fn test_empty_root_paths_is_not_absent() {
        let config: FilterConfig = toml::from_str("[vanity]\nroot_paths = []").unwrap();
        assert_eq!(config.vanity.root_paths, Some(Vec::new()));
    }
}
