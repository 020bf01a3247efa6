//! Property capability implemented by fixture target types
//!
//! Types built by a fixture factory expose which properties can be assigned
//! and accept JSON values for them. Most types get this from
//! [`impl_property_bag!`](crate::impl_property_bag) instead of a manual impl.

use crate::error::PropertyError;
use crate::Properties;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::any::Any;
use std::fmt::Debug;

/// Named, individually assignable properties of an object
pub trait PropertyBag {
    /// Whether `name` can be assigned. A `true` answer does not promise the
    /// value will be accepted.
    fn is_settable(&self, name: &str) -> bool;

    /// Assign `value` to the property `name`
    fn set_property(&mut self, name: &str, value: JsonValue) -> Result<(), PropertyError>;

    /// Read a property back as JSON
    fn get_property(&self, _name: &str) -> Option<JsonValue> {
        None
    }

    /// Names of the readable properties, used for snapshots
    fn property_names(&self) -> &'static [&'static str] {
        &[]
    }
}

/// Object-safe view of anything a fixture factory can construct
pub trait FixtureObject: PropertyBag + Debug + Send {
    /// Rust type name of the concrete object
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// All readable properties with their current values
    fn snapshot(&self) -> Properties {
        self.property_names()
            .iter()
            .filter_map(|name| {
                self.get_property(name)
                    .map(|value| (name.to_string(), value))
            })
            .collect()
    }
}

impl<T> FixtureObject for T
where
    T: PropertyBag + Any + Debug + Send,
{
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl<'a> dyn FixtureObject + 'a {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Deserialize a property value into the field type
pub fn convert_value<T: DeserializeOwned>(
    property: &str,
    value: JsonValue,
) -> Result<T, PropertyError> {
    serde_json::from_value(value).map_err(|source| PropertyError::InvalidValue {
        property: property.to_string(),
        source,
    })
}

/// Serialize a field for [`PropertyBag::get_property`]
pub fn read_value<T: Serialize>(value: &T) -> Option<JsonValue> {
    serde_json::to_value(value).ok()
}

/// Implement [`PropertyBag`] for a struct from a list of its fields
///
/// Every listed field must implement `Serialize` and `DeserializeOwned`.
///
/// ```
/// use elif_fixtures::impl_property_bag;
///
/// #[derive(Debug, Default)]
/// struct Post {
///     title: String,
///     published: bool,
/// }
///
/// impl_property_bag!(Post { title, published });
/// ```
#[macro_export]
macro_rules! impl_property_bag {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::property::PropertyBag for $ty {
            fn is_settable(&self, name: &str) -> bool {
                [$(stringify!($field)),+].contains(&name)
            }

            fn set_property(
                &mut self,
                name: &str,
                value: $crate::JsonValue,
            ) -> ::std::result::Result<(), $crate::error::PropertyError> {
                $(
                    if name == stringify!($field) {
                        self.$field = $crate::property::convert_value(name, value)?;
                        return Ok(());
                    }
                )+
                Err($crate::error::PropertyError::not_settable(name))
            }

            fn get_property(&self, name: &str) -> Option<$crate::JsonValue> {
                $(
                    if name == stringify!($field) {
                        return $crate::property::read_value(&self.$field);
                    }
                )+
                None
            }

            fn property_names(&self) -> &'static [&'static str] {
                &[$(stringify!($field)),+]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    struct Widget {
        color: String,
        size: u32,
        internal: bool,
    }

    crate::impl_property_bag!(Widget { color, size });

    #[test]
    fn test_is_settable() {
        let widget = Widget::default();
        assert!(widget.is_settable("color"));
        assert!(widget.is_settable("size"));
        assert!(!widget.is_settable("internal"));
        assert!(!widget.is_settable("__type"));
    }

    #[test]
    fn test_set_and_get_property() {
        let mut widget = Widget::default();
        widget.set_property("color", json!("red")).unwrap();
        widget.set_property("size", json!(3)).unwrap();

        assert_eq!(widget.color, "red");
        assert_eq!(widget.size, 3);
        assert_eq!(widget.get_property("color"), Some(json!("red")));
        assert_eq!(widget.get_property("internal"), None);
    }

    #[test]
    fn test_set_unknown_property() {
        let mut widget = Widget::default();
        let err = widget.set_property("internal", json!(true)).unwrap_err();
        assert!(matches!(err, PropertyError::NotSettable { .. }));
        assert!(!widget.internal);
    }

    #[test]
    fn test_set_ill_typed_property() {
        let mut widget = Widget::default();
        let err = widget.set_property("size", json!("large")).unwrap_err();
        assert_eq!(err.property(), "size");
        assert!(matches!(err, PropertyError::InvalidValue { .. }));
        assert_eq!(widget.size, 0);
    }

    #[test]
    fn test_snapshot_and_downcast() {
        let mut object: Box<dyn FixtureObject> = Box::new(Widget::default());
        object.set_property("color", json!("blue")).unwrap();

        let snapshot = object.snapshot();
        assert_eq!(snapshot.get("color"), Some(&json!("blue")));
        assert_eq!(snapshot.get("size"), Some(&json!(0)));
        assert!(object.type_name().ends_with("Widget"));
        assert!(object.is::<Widget>());
        assert_eq!(object.downcast_ref::<Widget>().map(|w| w.size), Some(0));
    }
}
