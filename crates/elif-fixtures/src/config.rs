//! Fixture factory configuration

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Environment variable selecting the property policy
pub const STRICT_ENV: &str = "ELIF_FIXTURES_STRICT";

/// Environment variable toggling skipped-property warnings
pub const LOG_SKIPPED_ENV: &str = "ELIF_FIXTURES_LOG_SKIPPED";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },
}

/// How the factory treats properties the target object cannot accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyPolicy {
    /// Skip the property and record it on the built object
    #[default]
    Lenient,
    /// Fail the build on the first property that cannot be assigned
    Strict,
}

impl PropertyPolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, PropertyPolicy::Strict)
    }
}

impl FromStr for PropertyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lenient" => Ok(PropertyPolicy::Lenient),
            "strict" => Ok(PropertyPolicy::Strict),
            _ => Err(ConfigError::InvalidValue {
                field: "property_policy".to_string(),
                value: s.to_string(),
                expected: "lenient or strict".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for PropertyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let policy = match self {
            PropertyPolicy::Lenient => "lenient",
            PropertyPolicy::Strict => "strict",
        };
        write!(f, "{}", policy)
    }
}

/// Behaviour switches shared by every fixture factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureConfig {
    pub property_policy: PropertyPolicy,
    /// Emit a warning for every skipped property
    pub log_skipped: bool,
}

impl FixtureConfig {
    pub fn new() -> Self {
        Self {
            property_policy: PropertyPolicy::Lenient,
            log_skipped: true,
        }
    }

    /// Configuration that rejects unknown or ill-typed properties
    pub fn strict() -> Self {
        Self {
            property_policy: PropertyPolicy::Strict,
            ..Self::new()
        }
    }

    /// Configuration that silently skips what cannot be assigned
    pub fn lenient() -> Self {
        Self {
            property_policy: PropertyPolicy::Lenient,
            log_skipped: false,
        }
    }

    pub fn with_property_policy(mut self, policy: PropertyPolicy) -> Self {
        self.property_policy = policy;
        self
    }

    pub fn with_log_skipped(mut self, log_skipped: bool) -> Self {
        self.log_skipped = log_skipped;
        self
    }

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(strict) = read_bool(STRICT_ENV)? {
            config.property_policy = if strict {
                PropertyPolicy::Strict
            } else {
                PropertyPolicy::Lenient
            };
        }

        if let Some(log_skipped) = read_bool(LOG_SKIPPED_ENV)? {
            config.log_skipped = log_skipped;
        }

        Ok(config)
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_bool(name: &str) -> Result<Option<bool>, ConfigError> {
    let value = match env::var(name) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(ConfigError::EnvironmentError {
                message: format!("{} is not valid unicode", name),
            })
        }
    };

    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidValue {
            field: name.to_string(),
            value,
            expected: "true, false, 1 or 0".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(STRICT_ENV);
        env::remove_var(LOG_SKIPPED_ENV);
    }

    #[test]
    fn test_default_config() {
        let config = FixtureConfig::default();
        assert_eq!(config.property_policy, PropertyPolicy::Lenient);
        assert!(config.log_skipped);
    }

    #[test]
    fn test_presets() {
        assert!(FixtureConfig::strict().property_policy.is_strict());
        assert!(!FixtureConfig::lenient().log_skipped);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("STRICT".parse::<PropertyPolicy>().unwrap(), PropertyPolicy::Strict);
        assert!("sloppy".parse::<PropertyPolicy>().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = FixtureConfig::from_env().unwrap();
        assert_eq!(config, FixtureConfig::new());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(STRICT_ENV, "1");
        env::set_var(LOG_SKIPPED_ENV, "off");

        let config = FixtureConfig::from_env().unwrap();
        assert_eq!(config.property_policy, PropertyPolicy::Strict);
        assert!(!config.log_skipped);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_garbage() {
        clear_env();
        env::set_var(STRICT_ENV, "maybe");

        let err = FixtureConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        clear_env();
    }
}
