//! Fixture definition tables
//!
//! A table maps fixture names to their default properties. Tables are
//! assembled once, either in code or from a JSON/YAML file, and are
//! read-only afterwards.

use crate::error::{FixtureError, FixtureResult};
use crate::{Properties, TYPE_KEY};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureDefinitions {
    definitions: BTreeMap<String, Properties>,
}

impl FixtureDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FixtureDefinitionsBuilder {
        FixtureDefinitionsBuilder::default()
    }

    /// Build a table from a JSON value shaped `{name: {property: value}}`
    pub fn from_value(value: JsonValue) -> FixtureResult<Self> {
        let JsonValue::Object(entries) = value else {
            return Err(FixtureError::configuration(
                "Fixture definitions must be a mapping of fixture names to properties",
            ));
        };

        let mut builder = Self::builder();
        for (name, properties) in entries {
            builder = builder.define_value(name, properties)?;
        }
        Ok(builder.build())
    }

    pub fn from_json_str(source: &str) -> FixtureResult<Self> {
        let value: JsonValue = serde_json::from_str(source)?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(source: &str) -> FixtureResult<Self> {
        let value: JsonValue = serde_yaml::from_str(source)?;
        Self::from_value(value)
    }

    /// Load a definition file, choosing the format by extension
    pub fn load(path: impl AsRef<Path>) -> FixtureResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        tracing::debug!("Loading fixture definitions from {}", path.display());

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            other => Err(FixtureError::configuration(format!(
                "Unsupported fixture definition format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Properties> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FixtureDefinitionsBuilder {
    definitions: BTreeMap<String, Properties>,
}

impl FixtureDefinitionsBuilder {
    /// Add or replace the definition for `name`
    pub fn define(mut self, name: impl Into<String>, properties: Properties) -> Self {
        self.definitions.insert(name.into(), properties);
        self
    }

    /// Add a definition given as a JSON value, which must be an object
    pub fn define_value(self, name: impl Into<String>, value: JsonValue) -> FixtureResult<Self> {
        let name = name.into();
        let properties = match value {
            JsonValue::Object(properties) => properties,
            JsonValue::Null => Properties::new(),
            _ => {
                return Err(FixtureError::configuration(format!(
                    "Fixture definition '{}' must be a mapping",
                    name
                )))
            }
        };

        if let Some(type_name) = properties.get(TYPE_KEY) {
            if !type_name.is_string() {
                return Err(FixtureError::configuration(format!(
                    "Fixture definition '{}' has a non-string {} entry",
                    name, TYPE_KEY
                )));
            }
        }

        Ok(self.define(name, properties))
    }

    pub fn build(self) -> FixtureDefinitions {
        FixtureDefinitions {
            definitions: self.definitions,
        }
    }
}
