//! Directory configuration.
//!
//! ```rust
//! use phone_directory::config::{DirectoryConfig, Normalization};
//! use std::time::Duration;
//!
//! let config = DirectoryConfig {
//!     max_page_size: 500,
//!     aggregate_timeout: Some(Duration::from_secs(5)),
//!     normalization: Normalization::Trim,
//!     ..DirectoryConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::{DirectoryError, DirectoryResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whitespace policy applied to payload strings before validation.
///
/// `Preserve` hands strings to the validation rules untouched, so leading or
/// trailing spaces count towards length limits and fail the phone and email
/// patterns. `Trim` strips surrounding whitespace first; a value that trims
/// to nothing is then treated as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    #[default]
    Preserve,
    Trim,
}

impl Normalization {
    pub(crate) fn apply(self, value: Option<String>) -> Option<String> {
        match self {
            Normalization::Preserve => value,
            Normalization::Trim => value.map(|v| v.trim().to_string()),
        }
    }
}

/// Runtime settings shared by the registries and the query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Page size used when a caller does not choose one.
    pub default_page_size: usize,

    /// Largest page a caller may request.
    pub max_page_size: usize,

    /// Upper bound on grouped aggregations. `None` disables the bound.
    pub aggregate_timeout: Option<Duration>,

    /// Whitespace policy for incoming payloads.
    pub normalization: Normalization,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
            aggregate_timeout: Some(Duration::from_secs(30)),
            normalization: Normalization::Preserve,
        }
    }
}

impl DirectoryConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.max_page_size == 0 {
            return Err(DirectoryError::invalid_argument(
                "max_page_size must be greater than zero",
            ));
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(DirectoryError::invalid_argument(format!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.max_page_size
            )));
        }

        if self.aggregate_timeout == Some(Duration::ZERO) {
            return Err(DirectoryError::invalid_argument(
                "aggregate_timeout must be non-zero when set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DirectoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 2000);
    }

    #[test]
    fn test_invalid_page_sizes() {
        let config = DirectoryConfig {
            max_page_size: 0,
            ..DirectoryConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DirectoryConfig {
            default_page_size: 50,
            max_page_size: 10,
            ..DirectoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DirectoryConfig {
            aggregate_timeout: Some(Duration::ZERO),
            ..DirectoryConfig::default()
        };
        assert!(config.validate().is_err());

        let unbounded = DirectoryConfig {
            aggregate_timeout: None,
            ..DirectoryConfig::default()
        };
        assert!(unbounded.validate().is_ok());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let config: DirectoryConfig =
            serde_json::from_str(r#"{"max_page_size": 100, "normalization": "trim"}"#).unwrap();
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.normalization, Normalization::Trim);
    }

    #[test]
    fn test_trim_normalization() {
        assert_eq!(
            Normalization::Trim.apply(Some("  EG ".to_string())),
            Some("EG".to_string())
        );
        assert_eq!(
            Normalization::Preserve.apply(Some("  EG ".to_string())),
            Some("  EG ".to_string())
        );
        assert_eq!(Normalization::Trim.apply(None), None);
    }
}
