//! Value helpers for fixture definitions and overrides

use rand::Rng;
use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Sequence generator for unique values
#[derive(Debug, Default)]
pub struct Sequence {
    current: AtomicUsize,
}

impl Sequence {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: usize) -> Self {
        Self {
            current: AtomicUsize::new(start),
        }
    }

    pub fn next(&self) -> usize {
        self.current.fetch_add(1, Ordering::SeqCst)
    }

    pub fn next_string(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next())
    }

    /// Next value as a JSON string, ready to drop into override properties
    pub fn next_value(&self, prefix: &str) -> JsonValue {
        JsonValue::String(self.next_string(prefix))
    }
}

fn alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random string property value, `<prefix>_<suffix>` when a prefix is given
pub fn random_value(prefix: Option<&str>) -> JsonValue {
    let suffix = alphanumeric(8);
    JsonValue::String(match prefix {
        Some(prefix) => format!("{}_{}", prefix, suffix),
        None => suffix,
    })
}

/// Random email property value under example.com, tagged with `local_prefix`
pub fn random_email(local_prefix: &str) -> JsonValue {
    JsonValue::String(format!(
        "{}_{}@example.com",
        local_prefix,
        alphanumeric(8).to_lowercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence() {
        let seq = Sequence::new();

        assert_eq!(seq.next(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.next_string("user"), "user2");
        assert_eq!(seq.next_value("user"), JsonValue::String("user3".to_string()));
    }

    #[test]
    fn test_sequence_starting_at() {
        let seq = Sequence::starting_at(100);
        assert_eq!(seq.next_string("post-"), "post-100");
    }

    #[test]
    fn test_random_value() {
        let value = random_value(Some("post"));
        let text = value.as_str().unwrap();
        assert!(text.starts_with("post_"));
        assert_eq!(text.len(), 13);
        assert_ne!(random_value(None), random_value(None));
    }

    #[test]
    fn test_random_email() {
        let email = random_email("editor");
        let text = email.as_str().unwrap();
        assert!(text.starts_with("editor_"));
        assert!(text.ends_with("@example.com"));
        assert_eq!(text, text.to_lowercase());
    }
}
