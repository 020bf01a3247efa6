//! Registry of constructible fixture types
//!
//! Fixture definitions name their target type by string (the factory's base
//! type or a `__type` entry). The registry maps those names to the type's
//! `Default` constructor.

use crate::property::FixtureObject;
use std::collections::HashMap;

/// Creates a fresh, default-initialized object
pub type Constructor = fn() -> Box<dyn FixtureObject>;

fn construct<T: FixtureObject + Default + 'static>() -> Box<dyn FixtureObject> {
    Box::new(T::default())
}

#[derive(Clone, Default)]
pub struct TypeRegistry {
    constructors: HashMap<String, Constructor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`, replacing any earlier registration
    pub fn register<T: FixtureObject + Default + 'static>(&mut self, name: impl Into<String>) {
        self.register_constructor(name, construct::<T>);
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with<T: FixtureObject + Default + 'static>(mut self, name: impl Into<String>) -> Self {
        self.register::<T>(name);
        self
    }

    pub fn register_constructor(&mut self, name: impl Into<String>, constructor: Constructor) {
        let name = name.into();
        tracing::debug!("Registering fixture type: {}", name);
        self.constructors.insert(name, constructor);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Construct a new instance of the type registered as `name`
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn FixtureObject>> {
        self.constructors.get(name).map(|constructor| constructor())
    }

    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Tag {
        label: String,
    }

    crate::impl_property_bag!(Tag { label });

    #[test]
    fn test_registry_creation() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.instantiate("Tag").is_none());
    }

    #[test]
    fn test_register_and_instantiate() {
        let registry = TypeRegistry::new().with::<Tag>("Tag");

        assert!(registry.contains("Tag"));
        assert_eq!(registry.type_names(), vec!["Tag"]);

        let object = registry.instantiate("Tag").unwrap();
        assert_eq!(object.downcast_ref::<Tag>().map(|t| t.label.as_str()), Some(""));
    }

    #[test]
    fn test_each_instantiation_is_fresh() {
        let registry = TypeRegistry::new().with::<Tag>("Tag");

        let mut first = registry.instantiate("Tag").unwrap();
        first.downcast_mut::<Tag>().unwrap().label = "changed".to_string();

        let second = registry.instantiate("Tag").unwrap();
        assert_eq!(second.downcast_ref::<Tag>().unwrap().label, "");
    }
}
