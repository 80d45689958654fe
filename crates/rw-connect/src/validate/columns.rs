//! Column and primary-key validation.
//!
//! Requested columns are checked against discovered ones and turned into a
//! [`ColumnPlan`], the only input the table DDL builder accepts for a column
//! list. Every problem is reported, not just the first.
//!
//! Rules in [`ValidationMode::Live`]:
//!
//! - every requested column exists upstream (the error lists valid names)
//! - a column marked primary key is part of the upstream key
//! - every upstream key column is requested
//! - at least one requested column is a primary key
//!
//! [`ValidationMode::DryRun`] skips the cross-checks against discovery and
//! trusts overrides verbatim.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::schema::{ColumnInfo, ColumnSelection, TableInfo};
use crate::core::traits::{TypeMapper, FALLBACK_TYPE};

use super::{CheckResult, Checked, ValidationReport};

/// Whether requested columns are checked against discovered metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    Live,
    DryRun,
}

/// One column of a validated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedColumn {
    pub name: String,
    pub target_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Validated column list for one table, in DDL order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnPlan {
    columns: Vec<PlannedColumn>,
}

impl ColumnPlan {
    /// Plan every discovered column with mapped types and the upstream key.
    ///
    /// Lossy or unknown type mappings come back as warnings.
    pub fn from_discovered(columns: &[ColumnInfo], mapper: &dyn TypeMapper) -> Checked<ColumnPlan> {
        let mut ordered: Vec<&ColumnInfo> = columns.iter().collect();
        ordered.sort_by_key(|c| c.ordinal_position);

        let mut report = ValidationReport::default();
        let columns = ordered
            .into_iter()
            .map(|col| {
                let mapping = mapper.map_column(col);
                if let Some(warning) = mapping.warning {
                    report.caution(field(&col.name), warning);
                }
                PlannedColumn {
                    name: col.name.clone(),
                    target_type: mapping.target_type,
                    nullable: col.nullable,
                    primary_key: col.is_primary_key,
                }
            })
            .collect();

        Checked {
            value: ColumnPlan { columns },
            warnings: report.warnings,
        }
    }

    pub fn columns(&self) -> &[PlannedColumn] {
        &self.columns
    }

    /// Primary key column names in plan order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn field(column: &str) -> String {
    format!("columns.{}", column)
}

/// Validate a column request for `table` and build its plan.
pub fn validate_columns(
    table: &TableInfo,
    discovered: &[ColumnInfo],
    selection: &[ColumnSelection],
    mapper: &dyn TypeMapper,
    mode: ValidationMode,
) -> CheckResult<ColumnPlan> {
    let mut report = ValidationReport::default();

    if selection.is_empty() {
        report.fail(
            "columns",
            format!("no columns selected for {}", table.qualified_name()),
        );
        return Err(report);
    }

    let mut seen = HashSet::new();
    for sel in selection {
        if !seen.insert(sel.name.as_str()) {
            report.fail(field(&sel.name), format!("column '{}' is selected more than once", sel.name));
        }
    }

    let planned = match mode {
        ValidationMode::Live => plan_live(table, discovered, selection, mapper, &mut report),
        ValidationMode::DryRun => plan_dry_run(selection, &mut report),
    };

    if !selection.iter().any(|s| s.is_primary_key) {
        report.fail(
            "columns",
            format!(
                "at least one column of {} must be marked primary_key",
                table.qualified_name()
            ),
        );
    }

    report.finish(|| ColumnPlan { columns: planned })
}

fn plan_live(
    table: &TableInfo,
    discovered: &[ColumnInfo],
    selection: &[ColumnSelection],
    mapper: &dyn TypeMapper,
    report: &mut ValidationReport,
) -> Vec<PlannedColumn> {
    if discovered.is_empty() {
        report.fail(
            "columns",
            format!("no column metadata discovered for {}", table.qualified_name()),
        );
        return Vec::new();
    }

    let mut ordered: Vec<&ColumnInfo> = discovered.iter().collect();
    ordered.sort_by_key(|c| c.ordinal_position);
    let by_name: HashMap<&str, &ColumnInfo> =
        ordered.iter().map(|c| (c.name.as_str(), *c)).collect();
    let valid_names = ordered
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut seen = HashSet::new();
    let mut planned: Vec<(u32, PlannedColumn)> = Vec::with_capacity(selection.len());

    for sel in selection {
        if !seen.insert(sel.name.as_str()) {
            continue;
        }

        let Some(col) = by_name.get(sel.name.as_str()) else {
            report.fail(
                field(&sel.name),
                format!(
                    "column '{}' not found in {}; valid columns: {}",
                    sel.name,
                    table.qualified_name(),
                    valid_names
                ),
            );
            continue;
        };

        if sel.is_primary_key && !col.is_primary_key {
            report.fail(
                field(&sel.name),
                format!(
                    "column '{}' is marked primary_key but is not part of the upstream primary key",
                    sel.name
                ),
            );
        }
        if col.is_primary_key && !sel.is_primary_key {
            report.caution(
                field(&sel.name),
                format!(
                    "column '{}' is part of the upstream primary key but not marked primary_key",
                    sel.name
                ),
            );
        }

        let mapping = mapper.map_column(col);
        let target_type = match &sel.override_type {
            Some(override_type) => {
                if !override_type.eq_ignore_ascii_case(&mapping.target_type) {
                    report.caution(
                        field(&sel.name),
                        format!(
                            "type override {} differs from mapped type {}",
                            override_type, mapping.target_type
                        ),
                    );
                }
                override_type.clone()
            }
            None => {
                if let Some(warning) = mapping.warning {
                    report.caution(field(&sel.name), warning);
                }
                mapping.target_type
            }
        };

        let nullable = match sel.nullable_override {
            Some(nullable) => {
                if nullable != col.nullable {
                    report.caution(
                        field(&sel.name),
                        format!(
                            "nullable override {} differs from upstream nullability {}",
                            nullable, col.nullable
                        ),
                    );
                }
                nullable
            }
            None => col.nullable,
        };

        planned.push((
            col.ordinal_position,
            PlannedColumn {
                name: sel.name.clone(),
                target_type,
                nullable,
                primary_key: sel.is_primary_key,
            },
        ));
    }

    for col in ordered.iter().filter(|c| c.is_primary_key) {
        if !seen.contains(col.name.as_str()) {
            report.fail(
                field(&col.name),
                format!(
                    "upstream primary key column '{}' must be selected",
                    col.name
                ),
            );
        }
    }

    planned.sort_by_key(|(ordinal, _)| *ordinal);
    planned.into_iter().map(|(_, column)| column).collect()
}

fn plan_dry_run(selection: &[ColumnSelection], report: &mut ValidationReport) -> Vec<PlannedColumn> {
    let mut seen = HashSet::new();
    selection
        .iter()
        .filter(|sel| seen.insert(sel.name.as_str()))
        .map(|sel| {
            let target_type = match &sel.override_type {
                Some(t) => t.clone(),
                None => {
                    report.caution(
                        field(&sel.name),
                        format!(
                            "no type given for '{}' in dry-run mode, using {}",
                            sel.name, FALLBACK_TYPE
                        ),
                    );
                    FALLBACK_TYPE.to_string()
                }
            };
            PlannedColumn {
                name: sel.name.clone(),
                target_type,
                nullable: sel.nullable_override.unwrap_or(true),
                primary_key: sel.is_primary_key,
            }
        })
        .collect()
}
