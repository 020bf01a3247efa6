//! Recursive merging of property mappings
//!
//! Override values win over base values. Nested mappings are merged key by
//! key; every other value (scalars, arrays) is replaced whole.

use crate::Properties;
use serde_json::Value as JsonValue;

/// Switches for [`merge_recursive_override_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Ignore override keys that do not exist in the base mapping
    pub dont_add_new_keys: bool,
    /// Let empty override values (null, false, 0, "", "0", [] or {}) replace base values
    pub empty_values_override: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            dont_add_new_keys: false,
            empty_values_override: true,
        }
    }
}

/// Merge `overrides` over `base` with the default options
pub fn merge_recursive_override(base: &Properties, overrides: &Properties) -> Properties {
    merge_recursive_override_with(base, overrides, MergeOptions::default())
}

pub fn merge_recursive_override_with(
    base: &Properties,
    overrides: &Properties,
    options: MergeOptions,
) -> Properties {
    let mut merged = base.clone();
    merge_into(&mut merged, overrides, options);
    merged
}

fn merge_into(target: &mut Properties, overrides: &Properties, options: MergeOptions) {
    for (key, value) in overrides {
        if let Some(JsonValue::Object(inner)) = target.get_mut(key) {
            match value {
                JsonValue::Object(nested)
                    if !(options.empty_values_override && nested.is_empty()) =>
                {
                    merge_into(inner, nested, options);
                }
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            }
            continue;
        }

        let exists = target.contains_key(key);
        let accepted = options.empty_values_override || !is_empty_value(value);

        if options.dont_add_new_keys {
            if exists && accepted {
                target.insert(key.clone(), value.clone());
            }
        } else if accepted || (!exists_non_null(target, key) && is_empty_collection(value)) {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn exists_non_null(target: &Properties, key: &str) -> bool {
    target.get(key).map_or(false, |v| !v.is_null())
}

fn is_empty_collection(value: &JsonValue) -> bool {
    match value {
        JsonValue::Array(items) => items.is_empty(),
        JsonValue::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Loose emptiness: null, false, zero, "", "0" and empty collections
pub fn is_empty_value(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => true,
        JsonValue::Bool(b) => !b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        JsonValue::String(s) => s.is_empty() || s == "0",
        JsonValue::Array(_) | JsonValue::Object(_) => is_empty_collection(value),
    }
}
