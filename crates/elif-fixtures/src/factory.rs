//! Fixture factory
//!
//! A factory owns a [`FactoryCore`] (definition table, type registry, base
//! type, persistence manager and configuration) and exposes building through
//! the [`FixtureFactory`] trait. Custom factories implement the trait, return
//! their core and override the hooks they need; `FactoryCore` itself is a
//! factory without hooks.

use crate::config::FixtureConfig;
use crate::definitions::FixtureDefinitions;
use crate::error::{FixtureError, FixtureResult, PropertyError};
use crate::merge::merge_recursive_override;
use crate::persistence::PersistenceManager;
use crate::property::FixtureObject;
use crate::registry::TypeRegistry;
use crate::{Properties, TYPE_KEY};
use serde_json::Value as JsonValue;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared state every fixture factory is built on
pub struct FactoryCore {
    name: String,
    definitions: FixtureDefinitions,
    types: TypeRegistry,
    base_type: Option<String>,
    persistence: Option<Arc<dyn PersistenceManager>>,
    config: FixtureConfig,
}

impl FactoryCore {
    /// Create a core named `name`, used in diagnostics
    pub fn new(name: impl Into<String>, definitions: FixtureDefinitions) -> Self {
        Self {
            name: name.into(),
            definitions,
            types: TypeRegistry::new(),
            base_type: None,
            persistence: None,
            config: FixtureConfig::default(),
        }
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Register `T` as constructible under `name`
    pub fn register_type<T: FixtureObject + Default + 'static>(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.types.register::<T>(name);
        self
    }

    /// Type built when a definition carries no `__type`
    pub fn with_base_type(mut self, type_name: impl Into<String>) -> Self {
        self.base_type = Some(type_name.into());
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn PersistenceManager>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_config(mut self, config: FixtureConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definitions(&self) -> &FixtureDefinitions {
        &self.definitions
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn base_type(&self) -> Option<&str> {
        self.base_type.as_deref()
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn has_persistence(&self) -> bool {
        self.persistence.is_some()
    }

    fn resolve_type(&self, fixture: &str, declared: Option<JsonValue>) -> FixtureResult<String> {
        match declared {
            Some(JsonValue::String(type_name)) => Ok(type_name),
            Some(other) => Err(FixtureError::configuration(format!(
                "Fixture '{}' declares a non-string {}: {}",
                fixture, TYPE_KEY, other
            ))),
            None => self.base_type.clone().ok_or_else(|| {
                FixtureError::configuration(format!(
                    "Fixture '{}' has no {} and factory '{}' has no base type",
                    fixture, TYPE_KEY, self.name
                ))
            }),
        }
    }

    fn assign_properties(
        &self,
        object: &mut dyn FixtureObject,
        type_name: &str,
        properties: &Properties,
    ) -> FixtureResult<Vec<SkippedProperty>> {
        let strict = self.config.property_policy.is_strict();
        let mut skipped = Vec::new();

        for (name, value) in properties {
            let result = if object.is_settable(name) {
                object.set_property(name, value.clone())
            } else {
                Err(PropertyError::not_settable(name.as_str()))
            };

            let Err(property_error) = result else {
                continue;
            };

            if strict {
                return Err(FixtureError::from_property(type_name, property_error));
            }

            let skip = SkippedProperty::from_error(property_error);
            if self.config.log_skipped {
                warn!(
                    "Skipping property '{}' on {}: {}",
                    skip.name, type_name, skip.reason
                );
            }
            skipped.push(skip);
        }

        Ok(skipped)
    }

    fn add_to_persistence(&self, type_name: &str, object: &dyn FixtureObject) -> FixtureResult<()> {
        let persistence = self.persistence.as_ref().ok_or_else(|| self.missing_persistence())?;

        persistence
            .add(type_name, object)
            .map_err(|source| FixtureError::Persistence {
                type_name: type_name.to_string(),
                source,
            })?;

        info!("Registered {} with the persistence manager", type_name);
        Ok(())
    }

    fn missing_persistence(&self) -> FixtureError {
        FixtureError::configuration(format!(
            "Factory '{}' has no persistence manager",
            self.name
        ))
    }
}

impl std::fmt::Debug for FactoryCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryCore")
            .field("name", &self.name)
            .field("definitions", &self.definitions.names().collect::<Vec<_>>())
            .field("types", &self.types)
            .field("base_type", &self.base_type)
            .field("persistence", &self.persistence.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Why a property was left unassigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotSettable,
    InvalidValue(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NotSettable => write!(f, "not settable"),
            SkipReason::InvalidValue(message) => write!(f, "invalid value ({})", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProperty {
    pub name: String,
    pub reason: SkipReason,
}

impl SkippedProperty {
    fn from_error(error: PropertyError) -> Self {
        match error {
            PropertyError::NotSettable { property } => Self {
                name: property,
                reason: SkipReason::NotSettable,
            },
            PropertyError::InvalidValue { property, source } => Self {
                name: property,
                reason: SkipReason::InvalidValue(source.to_string()),
            },
        }
    }
}

/// An object produced by a fixture factory
///
/// The caller owns it; factories keep no reference to what they build.
#[derive(Debug)]
pub struct BuiltObject {
    fixture: String,
    type_name: String,
    object: Box<dyn FixtureObject>,
    skipped: Vec<SkippedProperty>,
    persisted: bool,
}

impl BuiltObject {
    /// Fixture name this object was built from
    pub fn fixture(&self) -> &str {
        &self.fixture
    }

    /// Registered type name the object was constructed as
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn object(&self) -> &dyn FixtureObject {
        self.object.as_ref()
    }

    pub fn object_mut(&mut self) -> &mut dyn FixtureObject {
        self.object.as_mut()
    }

    /// Properties that were present but could not be assigned
    pub fn skipped(&self) -> &[SkippedProperty] {
        &self.skipped
    }

    pub fn was_skipped(&self, property: &str) -> bool {
        self.skipped.iter().any(|skip| skip.name == property)
    }

    /// Whether the object was handed to the persistence manager
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn get(&self, property: &str) -> Option<JsonValue> {
        self.object.get_property(property)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.object.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    /// Take the concrete object out, failing if it is not a `T`
    pub fn downcast<T: Any>(self) -> FixtureResult<T> {
        let actual = self.object.type_name();
        match self.object.into_any().downcast::<T>() {
            Ok(object) => Ok(*object),
            Err(_) => Err(FixtureError::TypeMismatch {
                fixture: self.fixture,
                expected: std::any::type_name::<T>().to_string(),
                actual: actual.to_string(),
            }),
        }
    }

    pub fn into_inner(self) -> Box<dyn FixtureObject> {
        self.object
    }
}

/// A convention-named factory method, e.g. `buildPost` or `createUserAccount`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureCall {
    Build(String),
    Create(String),
}

impl FixtureCall {
    /// Parse a method name into the fixture it builds or creates
    ///
    /// Both prefixes need at least two characters after them. The first of
    /// those is lowercased to form the fixture name.
    pub fn parse(method_name: &str) -> Option<Self> {
        if let Some(rest) = method_name.strip_prefix("build") {
            if method_name.len() > 6 {
                return Some(FixtureCall::Build(decapitalize(rest)));
            }
        } else if let Some(rest) = method_name.strip_prefix("create") {
            if method_name.len() > 7 {
                return Some(FixtureCall::Create(decapitalize(rest)));
            }
        }
        None
    }

    pub fn fixture_name(&self) -> &str {
        match self {
            FixtureCall::Build(name) | FixtureCall::Create(name) => name,
        }
    }

    pub fn adds_to_persistence(&self) -> bool {
        matches!(self, FixtureCall::Create(_))
    }
}

/// Lowercase the first character only, ASCII letters only
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => std::iter::once(first.to_ascii_lowercase())
            .chain(chars)
            .collect(),
        None => String::new(),
    }
}

/// Builds objects from named fixture definitions
pub trait FixtureFactory {
    fn core(&self) -> &FactoryCore;

    /// Hook for assignments the generic property setter cannot express
    fn set_custom_properties(
        &self,
        _object: &mut dyn FixtureObject,
        _properties: &Properties,
        _add_to_persistence: bool,
    ) -> FixtureResult<()> {
        Ok(())
    }

    /// Clear instance caches kept by the factory
    fn reset(&mut self) {}

    /// Build the fixture `object_name` with `override_properties` merged over
    /// its definition, registering it for persistence if asked to
    fn build_object(
        &self,
        object_name: &str,
        override_properties: Properties,
        add_to_persistence: bool,
    ) -> FixtureResult<BuiltObject> {
        let core = self.core();
        let definition = core
            .definitions()
            .get(object_name)
            .ok_or_else(|| FixtureError::unknown_fixture(object_name))?;

        if add_to_persistence && !core.has_persistence() {
            return Err(core.missing_persistence());
        }

        let mut properties = merge_recursive_override(definition, &override_properties);
        let type_name = core.resolve_type(object_name, properties.remove(TYPE_KEY))?;

        let mut object =
            core.types()
                .instantiate(&type_name)
                .ok_or_else(|| FixtureError::UnknownType {
                    fixture: object_name.to_string(),
                    type_name: type_name.clone(),
                })?;

        debug!(
            "Building fixture '{}' as {} with {} properties",
            object_name,
            type_name,
            properties.len()
        );

        let skipped = core.assign_properties(object.as_mut(), &type_name, &properties)?;
        self.set_custom_properties(object.as_mut(), &properties, add_to_persistence)?;

        if add_to_persistence {
            core.add_to_persistence(&type_name, object.as_ref())?;
        }

        Ok(BuiltObject {
            fixture: object_name.to_string(),
            type_name,
            object,
            skipped,
            persisted: add_to_persistence,
        })
    }

    /// Build the fixture and register it with the persistence manager
    fn create_object(
        &self,
        object_name: &str,
        override_properties: Properties,
    ) -> FixtureResult<BuiltObject> {
        self.build_object(object_name, override_properties, true)
    }

    /// Dispatch a convention-named method such as `buildPost` or `createPost`
    ///
    /// `argument` stands in for the method's first argument; a missing one
    /// means no overrides.
    fn call(&self, method_name: &str, argument: Option<Properties>) -> FixtureResult<BuiltObject> {
        let overrides = argument.unwrap_or_default();
        match FixtureCall::parse(method_name) {
            Some(FixtureCall::Build(name)) => self.build_object(&name, overrides, false),
            Some(FixtureCall::Create(name)) => self.create_object(&name, overrides),
            None => {
                let factory = self.core().name();
                error!("Call to undefined method {}::{}", factory, method_name);
                Err(FixtureError::method_not_found(factory, method_name))
            }
        }
    }

    fn build_many(
        &self,
        object_name: &str,
        override_properties: Properties,
        count: usize,
    ) -> FixtureResult<Vec<BuiltObject>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.build_object(object_name, override_properties.clone(), false)?);
        }
        Ok(results)
    }

    fn create_many(
        &self,
        object_name: &str,
        override_properties: Properties,
        count: usize,
    ) -> FixtureResult<Vec<BuiltObject>> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.create_object(object_name, override_properties.clone())?);
        }
        Ok(results)
    }

    /// Build and downcast to the expected concrete type
    fn build_as<T: Any>(&self, object_name: &str, override_properties: Properties) -> FixtureResult<T>
    where
        Self: Sized,
    {
        self.build_object(object_name, override_properties, false)?
            .downcast::<T>()
    }

    fn create_as<T: Any>(&self, object_name: &str, override_properties: Properties) -> FixtureResult<T>
    where
        Self: Sized,
    {
        self.create_object(object_name, override_properties)?
            .downcast::<T>()
    }
}

impl FixtureFactory for FactoryCore {
    fn core(&self) -> &FactoryCore {
        self
    }
}

/// Generate named `build_*` / `create_*` methods for fixtures of a factory
///
/// ```
/// use elif_fixtures::prelude::*;
/// use elif_fixtures::{fixture_methods, impl_property_bag, properties};
///
/// #[derive(Debug, Default)]
/// struct Post {
///     title: String,
/// }
/// impl_property_bag!(Post { title });
///
/// struct BlogFixtures {
///     core: FactoryCore,
/// }
///
/// impl FixtureFactory for BlogFixtures {
///     fn core(&self) -> &FactoryCore {
///         &self.core
///     }
/// }
///
/// fixture_methods!(BlogFixtures {
///     "post" => build_post, create_post;
/// });
///
/// let definitions = FixtureDefinitions::builder()
///     .define("post", properties!({"title": "Untitled"}))
///     .build();
/// let fixtures = BlogFixtures {
///     core: FactoryCore::new("BlogFixtures", definitions)
///         .register_type::<Post>("Post")
///         .with_base_type("Post"),
/// };
///
/// let post = fixtures.build_post(Properties::new()).unwrap();
/// assert_eq!(post.downcast_ref::<Post>().unwrap().title, "Untitled");
/// ```
#[macro_export]
macro_rules! fixture_methods {
    ($factory:ty { $($fixture:literal => $build:ident, $create:ident);+ $(;)? }) => {
        impl $factory {
            $(
                #[allow(dead_code)]
                pub fn $build(
                    &self,
                    overrides: $crate::Properties,
                ) -> $crate::FixtureResult<$crate::BuiltObject> {
                    $crate::FixtureFactory::build_object(self, $fixture, overrides, false)
                }

                #[allow(dead_code)]
                pub fn $create(
                    &self,
                    overrides: $crate::Properties,
                ) -> $crate::FixtureResult<$crate::BuiltObject> {
                    $crate::FixtureFactory::create_object(self, $fixture, overrides)
                }
            )+
        }
    };
}
