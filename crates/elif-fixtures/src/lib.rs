//! # elif-fixtures - Test Fixture Factories
//!
//! Builds test objects from named fixture definitions. A definition is a
//! map of default property values; the factory constructs the target type,
//! assigns the merged properties and can register the result with a
//! persistence manager.
//!
//! ## Features
//!
//! - **Definition tables**: declared in code or loaded from JSON/YAML files
//! - **Recursive overrides**: caller-supplied properties merged over defaults
//! - **Type selection**: a base type per factory, `__type` per fixture
//! - **Persistence registration**: `create_*` hands objects to a manager
//! - **Convention dispatch**: `call("buildPost", ..)` and generated methods
//!
//! ## Quick Start
//!
//! ```rust
//! use elif_fixtures::prelude::*;
//! use elif_fixtures::{impl_property_bag, properties};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default)]
//! struct Post {
//!     title: String,
//!     published: bool,
//! }
//!
//! impl_property_bag!(Post { title, published });
//!
//! let definitions = FixtureDefinitions::builder()
//!     .define("post", properties!({"title": "Untitled", "published": false}))
//!     .build();
//! let persistence = Arc::new(InMemoryPersistence::new());
//!
//! let fixtures = FactoryCore::new("BlogFixtures", definitions)
//!     .register_type::<Post>("Post")
//!     .with_base_type("Post")
//!     .with_persistence(persistence.clone());
//!
//! let post: Post = fixtures.build_as("post", properties!({"published": true})).unwrap();
//! assert_eq!(post.title, "Untitled");
//! assert!(post.published);
//!
//! fixtures.call("createPost", None).unwrap();
//! assert_eq!(persistence.count(), 1);
//! ```

pub mod config;
pub mod definitions;
pub mod error;
pub mod factory;
pub mod merge;
pub mod persistence;
pub mod property;
pub mod registry;
pub mod values;

pub use config::{ConfigError, FixtureConfig, PropertyPolicy};
pub use definitions::{FixtureDefinitions, FixtureDefinitionsBuilder};
pub use error::{BoxError, FixtureError, FixtureResult, PropertyError};
pub use factory::{
    BuiltObject, FactoryCore, FixtureCall, FixtureFactory, SkipReason, SkippedProperty,
};
pub use merge::{merge_recursive_override, merge_recursive_override_with, MergeOptions};
pub use persistence::{InMemoryPersistence, PersistedRecord, PersistenceManager};
pub use property::{FixtureObject, PropertyBag};
pub use registry::TypeRegistry;
pub use serde_json::Value as JsonValue;

#[doc(hidden)]
pub use serde_json as __serde_json;

/// Property mapping used for definitions and overrides
pub type Properties = serde_json::Map<String, JsonValue>;

/// Reserved property selecting the type a fixture builds
pub const TYPE_KEY: &str = "__type";

/// Build a [`Properties`] map from a JSON object literal
///
/// ```
/// use elif_fixtures::properties;
///
/// let overrides = properties!({"title": "Hello", "tags": ["a", "b"]});
/// assert_eq!(overrides.len(), 2);
/// ```
#[macro_export]
macro_rules! properties {
    ({ $($tt:tt)* }) => {
        match $crate::__serde_json::json!({ $($tt)* }) {
            $crate::JsonValue::Object(map) => map,
            _ => unreachable!("an object literal always yields a JSON object"),
        }
    };
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BuiltObject, FactoryCore, FixtureConfig, FixtureDefinitions, FixtureError, FixtureFactory,
        FixtureObject, FixtureResult, InMemoryPersistence, PersistenceManager, Properties,
        PropertyBag, PropertyPolicy, TypeRegistry, TYPE_KEY,
    };

    pub use crate::values::{random_email, random_value, Sequence};
    pub use serde_json::{json, Value as JsonValue};
}
