//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Check the content repository for unusable entries
//! - Lint root path declarations without rejecting them
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FilterConfig → Result<(), Vec<ValidationError>>
//! - Root path declarations are permissive; suspicious ones only produce warnings

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::FilterConfig;

/// A semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("content path '{0}' must be absolute")]
    RelativeContentPath(String),

    #[error("content path '{0}' is declared more than once")]
    DuplicateContentPath(String),

    #[error("redirect '{0}' has no sling:target attribute")]
    MissingTarget(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &FilterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for resource in &config.content {
        if !resource.path.starts_with('/') {
            errors.push(ValidationError::RelativeContentPath(resource.path.clone()));
        }
        if !seen.insert(resource.path.as_str()) {
            errors.push(ValidationError::DuplicateContentPath(resource.path.clone()));
        }
        if resource.is_redirect() && resource.target().is_none() {
            errors.push(ValidationError::MissingTarget(resource.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Warnings for root path declarations that are accepted but likely mistakes.
pub fn lint_root_paths(declarations: &[String]) -> Vec<String> {
    let mut warnings = Vec::new();
    let mut prefixes = HashSet::new();

    for declaration in declarations {
        let (prefix, targets) = match declaration.split_once('=') {
            Some((prefix, targets)) => (prefix.trim(), Some(targets)),
            None => (declaration.trim(), None),
        };

        if prefix.is_empty() {
            warnings.push(format!("root path '{declaration}' has a blank prefix and matches every request"));
        }
        if let Some(targets) = targets {
            if targets.split(',').any(|t| t.trim().is_empty()) {
                warnings.push(format!("root path '{declaration}' contains blank targets, they are ignored"));
            }
        }
        if !prefixes.insert(prefix) {
            warnings.push(format!("root path prefix '{prefix}' is declared more than once, last declaration wins"));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Resource, REDIRECT_RESOURCE_TYPE};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&FilterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FilterConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.content = vec![
            Resource::new("relative", "page"),
            Resource::new("/MyVanity", REDIRECT_RESOURCE_TYPE),
            Resource::new("/MyVanity", "page"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    field: "listener.bind_address",
                    value: "not-an-address".into(),
                },
                ValidationError::ZeroTimeout,
                ValidationError::RelativeContentPath("relative".into()),
                ValidationError::MissingTarget("/MyVanity".into()),
                ValidationError::DuplicateContentPath("/MyVanity".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = FilterConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }

    #[test]
    fn test_lint_root_paths() {
        let declarations = vec![
            "/content/site/".to_string(),
            " ".to_string(),
            "/content/fr/=/content/fr/,,".to_string(),
            "/content/site/=/content/media/".to_string(),
        ];

        let warnings = lint_root_paths(&declarations);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("blank prefix"));
        assert!(warnings[1].contains("blank targets"));
        assert!(warnings[2].contains("more than once"));
    }

    #[test]
    fn test_lint_clean_declarations() {
        let declarations = vec!["/content/site/".to_string(), "/content/fr/=/content/fr/".to_string()];
        assert!(lint_root_paths(&declarations).is_empty());
    }
}
