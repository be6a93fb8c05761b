//! Message bundles
//!
//! A [`Message`] maps string keys to arbitrary JSON payloads for one locale.
//! A [`MessageTable`] maps each [`Locale`] to exactly one `Message` and is
//! shared read-only by every scope of a store.

use crate::{Locale, LocaleError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Messages for a single locale.
///
/// Values are opaque at this layer: strings, numbers, nested objects or
/// arrays are returned exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message {
    entries: Map<String, Value>,
}

impl Message {
    /// Create an empty message bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Build from a JSON object.
    pub fn from_json_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(LocaleError::ParseError(format!(
                "expected an object of messages, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a key whose value is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Message
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut message = Self::new();
        for (key, value) in iter {
            message.insert(key, value);
        }
        message
    }
}

/// Immutable table of message bundles keyed by locale.
///
/// Cloning shares the underlying table. Each bundle sits behind its own
/// `Arc`, so reading a bundle for the current locale hands out the same
/// allocation every time.
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    bundles: Arc<BTreeMap<Locale, Arc<Message>>>,
}

impl MessageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style bundle registration. Replaces an existing bundle for
    /// the same locale.
    ///
    /// Clones of the table taken earlier are not affected.
    pub fn with_bundle(mut self, locale: impl Into<Locale>, message: Message) -> Self {
        Arc::make_mut(&mut self.bundles).insert(locale.into(), Arc::new(message));
        self
    }

    /// Parse a table from JSON text shaped as `{ "<locale>": { "<key>": <value> } }`.
    ///
    /// # Examples
    ///
    /// ```
    /// use locale_scope_store::MessageTable;
    ///
    /// let table = MessageTable::from_json(r#"{
    ///     "en": { "greeting": "Hello" },
    ///     "fr": { "greeting": "Bonjour" }
    /// }"#).unwrap();
    ///
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.get("fr").unwrap().get_str("greeting"), Some("Bonjour"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(value)
    }

    /// Build a table from an already-parsed JSON object.
    ///
    /// Locale keys are used verbatim. Blank or whitespace-padded keys are
    /// rejected with [`LocaleError::InvalidLocale`].
    pub fn from_json_value(value: Value) -> Result<Self> {
        let locales = match value {
            Value::Object(locales) => locales,
            other => {
                return Err(LocaleError::ParseError(format!(
                    "expected an object keyed by locale, found {}",
                    json_kind(&other)
                )));
            }
        };

        let mut bundles = BTreeMap::new();
        for (tag, messages) in locales {
            // Keys are taken verbatim so distinct keys never collapse.
            if tag.trim().is_empty() || tag.trim() != tag {
                return Err(LocaleError::InvalidLocale(tag));
            }
            let locale = Locale::new(&tag);
            let message = Message::from_json_value(messages).map_err(|e| match e {
                LocaleError::ParseError(msg) => {
                    LocaleError::ParseError(format!("locale {}: {}", locale, msg))
                }
                other => other,
            })?;
            bundles.insert(locale, Arc::new(message));
        }

        Ok(Self {
            bundles: Arc::new(bundles),
        })
    }

    /// Bundle for a locale, if present.
    pub fn get<Q>(&self, locale: &Q) -> Option<&Arc<Message>>
    where
        Locale: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bundles.get(locale)
    }

    pub fn contains<Q>(&self, locale: &Q) -> bool
    where
        Locale: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.bundles.contains_key(locale)
    }

    /// All locales in the table, in sorted order. Suitable for a locale menu.
    pub fn locales(&self) -> impl Iterator<Item = &Locale> {
        self.bundles.keys()
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Whether two tables share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bundles, &other.bundles)
    }
}

impl<L> FromIterator<(L, Message)> for MessageTable
where
    L: Into<Locale>,
{
    fn from_iter<I: IntoIterator<Item = (L, Message)>>(iter: I) -> Self {
        let bundles = iter
            .into_iter()
            .map(|(locale, message)| (locale.into(), Arc::new(message)))
            .collect();
        Self {
            bundles: Arc::new(bundles),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_builder() {
        let message = Message::new()
            .with("greeting", "Hello")
            .with("count", 3)
            .with("nested", json!({ "a": [1, 2] }));

        assert_eq!(message.len(), 3);
        assert_eq!(message.get_str("greeting"), Some("Hello"));
        assert_eq!(message.get("count"), Some(&json!(3)));
        assert_eq!(message.get("nested"), Some(&json!({ "a": [1, 2] })));
        assert_eq!(message.get_str("count"), None);
        assert!(message.get("missing").is_none());
    }

    #[test]
    fn test_message_from_non_object() {
        let err = Message::from_json_value(json!(["a"])).unwrap_err();
        assert!(matches!(err, LocaleError::ParseError(_)));
    }

    #[test]
    fn test_table_from_json() {
        let table = MessageTable::from_json(
            r#"{
                "en": { "greeting": "Hello", "items": { "one": "item" } },
                "fr": { "greeting": "Bonjour" }
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.contains("en"));
        assert_eq!(table.get("en").unwrap().get("items"), Some(&json!({ "one": "item" })));
        let locales: Vec<_> = table.locales().map(Locale::as_str).collect();
        assert_eq!(locales, vec!["en", "fr"]);
    }

    #[test]
    fn test_table_from_json_rejects_bad_shapes() {
        assert!(matches!(
            MessageTable::from_json("[1, 2]"),
            Err(LocaleError::ParseError(_))
        ));
        assert!(matches!(
            MessageTable::from_json(r#"{ "en": "Hello" }"#),
            Err(LocaleError::ParseError(msg)) if msg.contains("locale en")
        ));
        assert!(matches!(
            MessageTable::from_json(r#"{ " ": {} }"#),
            Err(LocaleError::InvalidLocale(_))
        ));
        assert!(matches!(
            MessageTable::from_json("{ not json"),
            Err(LocaleError::JsonError(_))
        ));
    }

    #[test]
    fn test_table_from_json_rejects_padded_locale_keys() {
        match MessageTable::from_json(r#"{ " en": { "k": "a" }, "en": { "k": "b" } }"#) {
            Err(LocaleError::InvalidLocale(tag)) => assert_eq!(tag, " en"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            MessageTable::from_json(r#"{ "fr\t": {} }"#),
            Err(LocaleError::InvalidLocale(_))
        ));

        let table = MessageTable::from_json(r#"{ "en-US": {}, "fr": {} }"#).unwrap();
        assert!(table.contains("en-US"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_bundle_identity_is_stable() {
        let table: MessageTable = [("en", Message::new().with("k", "v"))].into_iter().collect();
        let a = table.get("en").unwrap();
        let b = table.clone().get("en").unwrap().clone();
        assert!(Arc::ptr_eq(a, &b));
    }

    #[test]
    fn test_with_bundle_does_not_touch_earlier_clones() {
        let base = MessageTable::new().with_bundle("en", Message::new());
        let shared = base.clone();
        let extended = base.with_bundle("fr", Message::new());

        assert_eq!(shared.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(!shared.ptr_eq(&extended));
    }
}
