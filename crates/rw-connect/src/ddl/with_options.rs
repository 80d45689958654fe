//! Ordered `WITH (...)` property lists.
//!
//! Properties keep insertion order. Missing, empty, and default values are
//! skipped at push time, so a rendered clause never contains `key=''`.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::config::Secret;
use crate::core::identifier::quote_literal;

/// Indentation of clause bodies.
pub(crate) const INDENT: &str = "    ";

/// An ordered list of `key='value'` properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithOptions {
    entries: Vec<(String, String)>,
}

impl WithOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property; empty values are skipped.
    pub fn push(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.entries.push((key.into(), value));
        }
        self
    }

    /// Add a property when a value is present.
    pub fn push_opt<V: Display>(&mut self, key: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// Add a credential when present.
    pub fn push_secret(&mut self, key: &str, value: Option<&Secret>) -> &mut Self {
        if let Some(secret) = value {
            self.push(key, secret.expose());
        }
        self
    }

    /// Add `key='true'` only when `flag` is set.
    pub fn push_flag(&mut self, key: &str, flag: bool) -> &mut Self {
        if flag {
            self.push(key, "true");
        }
        self
    }

    /// Add a property only when it differs from the connector default.
    pub fn push_non_default<V: Display + PartialEq>(&mut self, key: &str, value: V, default: V) -> &mut Self {
        if value != default {
            self.push(key, value);
        }
        self
    }

    /// Add every entry of `map` as `<prefix><key>`.
    pub fn extend_prefixed(&mut self, prefix: &str, map: &BTreeMap<String, String>) -> &mut Self {
        for (key, value) in map {
            self.push(format!("{}{}", prefix, key), value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn rendered_entries(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, quote_literal(v)))
    }

    /// ```text
    /// WITH (
    ///     k1='v1',
    ///     k2='v2'
    /// )
    /// ```
    pub fn render_block(&self) -> String {
        let body = self
            .rendered_entries()
            .map(|entry| format!("{}{}", INDENT, entry))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("WITH (\n{}\n)", body)
    }

    /// `WITH ( k1='v1', k2='v2' )`
    pub fn render_inline(&self) -> String {
        format!("WITH ( {} )", self.rendered_entries().collect::<Vec<_>>().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rendering_keeps_order() {
        let mut with = WithOptions::new();
        with.push("connector", "postgres-cdc").push("port", 5432);
        assert_eq!(
            with.render_block(),
            "WITH (\n    connector='postgres-cdc',\n    port='5432'\n)"
        );
    }

    #[test]
    fn test_inline_rendering() {
        let mut with = WithOptions::new();
        with.push("snapshot", "false");
        assert_eq!(with.render_inline(), "WITH ( snapshot='false' )");
    }

    #[test]
    fn test_skips_empty_and_missing() {
        let mut with = WithOptions::new();
        with.push("a", "")
            .push_opt::<&str>("b", None)
            .push_flag("c", false)
            .push_non_default("d", 30, 30)
            .push_secret("e", None);
        assert!(with.is_empty());
    }

    #[test]
    fn test_values_are_escaped() {
        let mut with = WithOptions::new();
        with.push("password", "it's");
        assert_eq!(with.render_inline(), "WITH ( password='it''s' )");
        assert_eq!(with.get("password"), Some("it's"));
    }

    #[test]
    fn test_extend_prefixed_sorted() {
        let mut map = BTreeMap::new();
        map.insert("snapshot.mode".to_string(), "never".to_string());
        map.insert("max.batch.size".to_string(), "10".to_string());
        let mut with = WithOptions::new();
        with.extend_prefixed("debezium.", &map);
        let keys: Vec<&str> = with.keys().collect();
        assert_eq!(keys, vec!["debezium.max.batch.size", "debezium.snapshot.mode"]);
    }
}
