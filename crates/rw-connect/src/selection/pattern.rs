//! Glob patterns for table selection.
//!
//! Patterns are compiled once into case-insensitive, anchored regular
//! expressions. `*` matches any run of characters and `?` exactly one.
//! A pattern matches a table when it matches either the qualified name
//! (`schema.table`) or the bare table name.

use regex::{Regex, RegexBuilder};

use crate::core::schema::TableRef;
use crate::error::{ConnectError, Result};

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Regex,
}

impl PatternMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(ConnectError::pattern(pattern, "pattern is empty"));
        }

        let regex = RegexBuilder::new(&glob_to_regex(pattern))
            .case_insensitive(true)
            .build()
            .map_err(|e| ConnectError::pattern(pattern, e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    #[inline]
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Match `schema.table` first, then the bare table name.
    pub fn matches_table(&self, table: &TableRef) -> bool {
        self.matches(&table.qualified_name()) || self.matches(&table.table_name)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// A list of patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PatternMatcher>,
}

impl PatternSet {
    pub fn from_patterns(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| PatternMatcher::new(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches_table(&self, table: &TableRef) -> bool {
        self.patterns.iter().any(|p| p.matches_table(table))
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let escaped = regex::escape(pattern);
    let regex_pattern = escaped.replace(r"\*", ".*").replace(r"\?", ".");
    format!("^{}$", regex_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(schema: &str, table: &str) -> TableRef {
        TableRef::new(schema, table)
    }

    #[test]
    fn test_case_insensitive() {
        let m = PatternMatcher::new("User*").unwrap();
        assert!(m.matches_table(&t("public", "users")));
        assert!(m.matches_table(&t("public", "USER_ROLES")));
        assert!(!m.matches_table(&t("public", "accounts")));
    }

    #[test]
    fn test_qualified_and_bare() {
        let m = PatternMatcher::new("sales.*").unwrap();
        assert!(m.matches_table(&t("sales", "orders")));
        assert!(!m.matches_table(&t("public", "orders")));

        let m = PatternMatcher::new("orders").unwrap();
        assert!(m.matches_table(&t("sales", "orders")));
    }

    #[test]
    fn test_anchored_and_literal_dot() {
        let m = PatternMatcher::new("public.t?").unwrap();
        assert!(m.matches_table(&t("public", "t1")));
        assert!(!m.matches_table(&t("public", "t12")));
        assert!(!m.matches("publicXt1"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(PatternMatcher::new("").is_err());
        assert!(PatternMatcher::new("  ").is_err());
    }

    #[test]
    fn test_pattern_set_any() {
        let set = PatternSet::from_patterns(&["a*".to_string(), "*_log".to_string()]).unwrap();
        assert!(set.matches_table(&t("public", "accounts")));
        assert!(set.matches_table(&t("public", "audit_log")));
        assert!(!set.matches_table(&t("public", "users")));
        assert!(PatternSet::default().is_empty());
    }
}
