//! Error types for the fixture factory

use crate::config::ConfigError;
use thiserror::Error;

/// Boxed error returned by external collaborators such as persistence managers
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building or persisting fixtures
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unknown fixture type '{type_name}' requested by fixture '{fixture}'")]
    UnknownType { fixture: String, type_name: String },

    #[error("Call to undefined method {factory}::{method}")]
    MethodNotFound { factory: String, method: String },

    #[error("Property '{property}' is not settable on {type_name}")]
    PropertyNotSettable { type_name: String, property: String },

    #[error("Invalid value for property '{property}' on {type_name}: {message}")]
    InvalidPropertyValue {
        type_name: String,
        property: String,
        message: String,
    },

    #[error("Fixture '{fixture}' built a {actual}, expected {expected}")]
    TypeMismatch {
        fixture: String,
        expected: String,
        actual: String,
    },

    #[error("Persistence error for {type_name}: {source}")]
    Persistence { type_name: String, source: BoxError },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixtureError {
    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// The error raised for a fixture name missing from the definition table
    pub fn unknown_fixture(name: &str) -> Self {
        Self::configuration(format!(
            "Object name {} not configured in fixture definitions",
            name
        ))
    }

    pub fn method_not_found(factory: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            factory: factory.into(),
            method: method.into(),
        }
    }

    /// Wrap a property assignment failure for the given target type
    pub fn from_property(type_name: &str, error: PropertyError) -> Self {
        match error {
            PropertyError::NotSettable { property } => Self::PropertyNotSettable {
                type_name: type_name.to_string(),
                property,
            },
            PropertyError::InvalidValue { property, source } => Self::InvalidPropertyValue {
                type_name: type_name.to_string(),
                property,
                message: source.to_string(),
            },
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

pub type FixtureResult<T> = Result<T, FixtureError>;

/// Failure to assign a single property onto an object
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("property '{property}' is not settable")]
    NotSettable { property: String },

    #[error("invalid value for property '{property}': {source}")]
    InvalidValue {
        property: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PropertyError {
    pub fn not_settable(property: impl Into<String>) -> Self {
        Self::NotSettable {
            property: property.into(),
        }
    }

    pub fn property(&self) -> &str {
        match self {
            Self::NotSettable { property } | Self::InvalidValue { property, .. } => property,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fixture_message() {
        let err = FixtureError::unknown_fixture("post");
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "Configuration error: Object name post not configured in fixture definitions"
        );
    }

    #[test]
    fn test_method_not_found_message() {
        let err = FixtureError::method_not_found("BlogFixtures", "frobnicate");
        assert_eq!(
            err.to_string(),
            "Call to undefined method BlogFixtures::frobnicate"
        );
    }

    #[test]
    fn test_from_property_error() {
        let err = FixtureError::from_property("Post", PropertyError::not_settable("slug"));
        match err {
            FixtureError::PropertyNotSettable { type_name, property } => {
                assert_eq!(type_name, "Post");
                assert_eq!(property, "slug");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
