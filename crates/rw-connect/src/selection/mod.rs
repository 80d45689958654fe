//! Table selection against a discovered schema.
//!
//! A [`TableSelection`] from configuration resolves into one
//! [`SelectionPolicy`], with precedence explicit list → include-all →
//! include patterns. [`TableSelector`] compiles the policy's patterns once and
//! applies it to discovered tables.
//!
//! Explicit names that discovery does not report become placeholders so CDC
//! can still be attempted; strict mode turns them into an error instead.

pub mod pattern;

pub use pattern::{PatternMatcher, PatternSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::schema::{TableInfo, TableRef};
use crate::error::{ConnectError, Result};

/// Table selection as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSelection {
    /// Take every discovered table (exclude patterns still apply).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_all: Option<bool>,

    /// Glob patterns; a table is kept when any pattern matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Glob patterns removing tables from include-all or pattern selections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Exact table names (`schema.table` or bare), in output order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explicit: Vec<String>,

    /// Fail when an explicit name is not discovered.
    #[serde(default)]
    pub strict: bool,
}

impl TableSelection {
    /// Resolve to a single policy.
    pub fn policy(&self) -> SelectionPolicy {
        if !self.explicit.is_empty() {
            return SelectionPolicy::Explicit(self.explicit.clone());
        }
        let include_all = self
            .include_all
            .unwrap_or(self.include.is_empty());
        if include_all {
            SelectionPolicy::All {
                exclude: self.exclude.clone(),
            }
        } else {
            SelectionPolicy::Patterns {
                include: self.include.clone(),
                exclude: self.exclude.clone(),
            }
        }
    }
}

/// How tables are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    Explicit(Vec<String>),
    All { exclude: Vec<String> },
    Patterns { include: Vec<String>, exclude: Vec<String> },
}

#[derive(Debug, Clone)]
enum CompiledPolicy {
    Explicit(Vec<String>),
    All { exclude: PatternSet },
    Patterns { include: PatternSet, exclude: PatternSet },
}

/// Applies a selection policy to discovered tables.
#[derive(Debug, Clone)]
pub struct TableSelector {
    policy: CompiledPolicy,
    default_schema: String,
    strict: bool,
}

impl TableSelector {
    /// Compile `policy`. Bare explicit names resolve into `default_schema`.
    pub fn new(policy: &SelectionPolicy, default_schema: impl Into<String>) -> Result<Self> {
        let policy = match policy {
            SelectionPolicy::Explicit(names) => CompiledPolicy::Explicit(names.clone()),
            SelectionPolicy::All { exclude } => CompiledPolicy::All {
                exclude: PatternSet::from_patterns(exclude)?,
            },
            SelectionPolicy::Patterns { include, exclude } => CompiledPolicy::Patterns {
                include: PatternSet::from_patterns(include)?,
                exclude: PatternSet::from_patterns(exclude)?,
            },
        };

        Ok(Self {
            policy,
            default_schema: default_schema.into(),
            strict: false,
        })
    }

    /// Reject explicit names missing from discovery.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn select(&self, discovered: &[TableInfo]) -> Result<Vec<TableInfo>> {
        let selected = match &self.policy {
            CompiledPolicy::Explicit(names) => self.select_explicit(names, discovered)?,
            CompiledPolicy::All { exclude } => discovered
                .iter()
                .filter(|t| !exclude.matches_table(&t.table))
                .cloned()
                .collect(),
            CompiledPolicy::Patterns { include, exclude } => discovered
                .iter()
                .filter(|t| include.matches_table(&t.table))
                .filter(|t| !exclude.matches_table(&t.table))
                .cloned()
                .collect(),
        };

        debug!(
            "Selected {} of {} discovered tables",
            selected.len(),
            discovered.len()
        );
        Ok(selected)
    }

    fn select_explicit(&self, names: &[String], discovered: &[TableInfo]) -> Result<Vec<TableInfo>> {
        let mut selected = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            let found = discovered
                .iter()
                .find(|t| t.qualified_name() == *name || t.table_name() == name.as_str());

            match found {
                Some(table) => selected.push(table.clone()),
                None => {
                    missing.push(name.as_str());
                    selected.push(TableInfo::placeholder(TableRef::parse(
                        name,
                        &self.default_schema,
                    )));
                }
            }
        }

        if !missing.is_empty() {
            if self.strict {
                return Err(ConnectError::Selection(format!(
                    "tables not found in discovered schema: {}",
                    missing.join(", ")
                )));
            }
            warn!(
                "Tables not discovered, will attempt CDC anyway: {}",
                missing.join(", ")
            );
        }

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered() -> Vec<TableInfo> {
        vec![
            TableInfo::new("public", "users"),
            TableInfo::new("public", "orders"),
            TableInfo::new("public", "orders_tmp"),
            TableInfo::new("sales", "invoices"),
        ]
    }

    fn names(tables: &[TableInfo]) -> Vec<String> {
        tables.iter().map(|t| t.qualified_name()).collect()
    }

    fn select(selection: TableSelection) -> Result<Vec<TableInfo>> {
        TableSelector::new(&selection.policy(), "public")?
            .strict(selection.strict)
            .select(&discovered())
    }

    // =========================================================================
    // Policy resolution
    // =========================================================================

    #[test]
    fn test_policy_precedence() {
        let sel = TableSelection {
            include_all: Some(true),
            include: vec!["a*".into()],
            explicit: vec!["users".into()],
            ..Default::default()
        };
        assert_eq!(sel.policy(), SelectionPolicy::Explicit(vec!["users".into()]));

        let sel = TableSelection {
            include_all: Some(true),
            include: vec!["a*".into()],
            ..Default::default()
        };
        assert!(matches!(sel.policy(), SelectionPolicy::All { .. }));
    }

    #[test]
    fn test_empty_selection_takes_everything() {
        assert_eq!(
            TableSelection::default().policy(),
            SelectionPolicy::All { exclude: vec![] }
        );
        let picked = select(TableSelection::default()).unwrap();
        assert_eq!(picked.len(), 4);
    }

    #[test]
    fn test_include_all_false_without_patterns_selects_nothing() {
        let picked = select(TableSelection {
            include_all: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert!(picked.is_empty());
    }

    // =========================================================================
    // Explicit lists
    // =========================================================================

    #[test]
    fn test_explicit_keeps_length_and_order() {
        let picked = select(TableSelection {
            explicit: vec!["sales.invoices".into(), "ghost".into(), "users".into()],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            names(&picked),
            vec!["sales.invoices", "public.ghost", "public.users"]
        );
        assert!(picked[1].is_placeholder());
        assert!(!picked[0].is_placeholder());
    }

    #[test]
    fn test_explicit_placeholder_splits_schema() {
        let picked = select(TableSelection {
            explicit: vec!["archive.old_orders".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(picked[0].schema_name(), "archive");
        assert_eq!(picked[0].table_name(), "old_orders");
    }

    #[test]
    fn test_explicit_ignores_excludes() {
        let picked = select(TableSelection {
            explicit: vec!["orders_tmp".into()],
            exclude: vec!["*_tmp".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(names(&picked), vec!["public.orders_tmp"]);
    }

    #[test]
    fn test_strict_rejects_missing() {
        let err = select(TableSelection {
            explicit: vec!["users".into(), "ghost".into(), "phantom".into()],
            strict: true,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConnectError::Selection(_)));
        assert!(err.to_string().contains("ghost, phantom"));
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    #[test]
    fn test_patterns_case_insensitive_in_discovery_order() {
        let picked = select(TableSelection {
            include: vec!["ORDER*".into(), "User*".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            names(&picked),
            vec!["public.users", "public.orders", "public.orders_tmp"]
        );
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let picked = select(TableSelection {
            include: vec!["orders*".into()],
            exclude: vec!["*_tmp".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(names(&picked), vec!["public.orders"]);
    }

    #[test]
    fn test_include_all_with_exclude() {
        let picked = select(TableSelection {
            include_all: Some(true),
            exclude: vec!["sales.*".into(), "orders_tmp".into()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(names(&picked), vec!["public.users", "public.orders"]);
    }

    #[test]
    fn test_bad_pattern_fails_at_construction() {
        let policy = SelectionPolicy::Patterns {
            include: vec!["".into()],
            exclude: vec![],
        };
        assert!(TableSelector::new(&policy, "public").is_err());
    }
}
