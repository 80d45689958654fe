//! Schema metadata for discovered tables and columns, and column requests.
//!
//! Discovered values (`TableInfo`, `ColumnInfo`) are ground truth reported by a
//! source database. Requested values (`ColumnSelection`, `TableColumnConfig`)
//! come from user configuration and are never trusted until validated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a table, collection or topic by schema and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Schema name (database name for MySQL and MongoDB).
    pub schema_name: String,
    /// Table name.
    pub table_name: String,
}

impl TableRef {
    pub fn new(schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
        }
    }

    /// Parse `schema.table`, splitting on the first dot. A bare name takes `default_schema`.
    pub fn parse(name: &str, default_schema: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) => Self::new(schema, table),
            None => Self::new(default_schema, name),
        }
    }

    /// `schema.table`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema_name, self.table_name)
    }
}

/// Kind of relation reported by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    #[default]
    BaseTable,
    View,
    Collection,
    Topic,
}

/// A discovered (or placeholder) table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(flatten)]
    pub table: TableRef,

    #[serde(default)]
    pub table_type: TableType,

    /// Approximate row count, when discovery reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Comment attached to tables that were requested explicitly but not discovered.
pub const PLACEHOLDER_COMMENT: &str = "not found, will attempt CDC";

impl TableInfo {
    pub fn new(schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            table: TableRef::new(schema_name, table_name),
            table_type: TableType::BaseTable,
            row_count: None,
            size_bytes: None,
            comment: None,
        }
    }

    /// Placeholder for an explicitly requested table missing from discovery.
    pub fn placeholder(table: TableRef) -> Self {
        Self {
            table,
            table_type: TableType::BaseTable,
            row_count: None,
            size_bytes: None,
            comment: Some(PLACEHOLDER_COMMENT.to_string()),
        }
    }

    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    pub fn schema_name(&self) -> &str {
        &self.table.schema_name
    }

    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    pub fn qualified_name(&self) -> String {
        self.table.qualified_name()
    }

    pub fn is_placeholder(&self) -> bool {
        self.comment.as_deref() == Some(PLACEHOLDER_COMMENT)
    }
}

/// A discovered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,

    /// Type name as reported by the source (e.g. `int4`, `varchar(255)`, `int unsigned`).
    pub native_type: String,

    #[serde(default = "default_true")]
    pub nullable: bool,

    /// 1-based position; defines DDL column order.
    #[serde(default)]
    pub ordinal_position: u32,

    #[serde(default)]
    pub is_primary_key: bool,

    /// Character length reported separately from the type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, native_type: impl Into<String>, ordinal_position: u32) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: true,
            ordinal_position,
            is_primary_key: false,
            max_length: None,
        }
    }

    /// Mark as primary key (implies NOT NULL).
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }
}

/// A user request for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    pub name: String,

    /// RisingWave type that replaces the mapped type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub override_type: Option<String>,

    #[serde(default, rename = "primary_key")]
    pub is_primary_key: bool,

    #[serde(default, rename = "nullable", skip_serializing_if = "Option::is_none")]
    pub nullable_override: Option<bool>,
}

impl ColumnSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            override_type: None,
            is_primary_key: false,
            nullable_override: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_type(mut self, target_type: impl Into<String>) -> Self {
        self.override_type = Some(target_type.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable_override = Some(nullable);
        self
    }
}

/// Per-table column configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumnConfig {
    /// Requested columns; `None` keeps every column without filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_columns: Option<Vec<ColumnSelection>>,

    /// Name of the RisingWave table, when it differs from the source table.
    #[serde(default, rename = "target_name", skip_serializing_if = "Option::is_none")]
    pub custom_target_name: Option<String>,
}

fn default_true() -> bool {
    true
}
