//! Pre-fetched schema metadata.
//!
//! A [`SchemaSnapshot`] holds the output of a discovery run (tables plus
//! their columns) and can be written by hand as YAML or JSON. It implements
//! [`Discovery`], so the compiler runs the same path with or without a live
//! connection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::schema::{ColumnInfo, TableInfo, TableRef};
use crate::core::traits::Discovery;
use crate::error::Result;

/// Discovered tables and their columns.
///
/// ```yaml
/// tables:
///   - { schema_name: public, table_name: orders, row_count: 1200 }
/// columns:
///   public.orders:
///     - { name: id, native_type: int4, nullable: false, ordinal_position: 1, is_primary_key: true }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<TableInfo>,

    /// Columns keyed by qualified (`schema.table`) or bare table name.
    #[serde(default)]
    pub columns: BTreeMap<String, Vec<ColumnInfo>>,
}

impl SchemaSnapshot {
    /// Load a snapshot file; `.json` files are read as JSON, anything else as YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a table with its columns.
    pub fn with_table(mut self, table: TableInfo, columns: Vec<ColumnInfo>) -> Self {
        self.columns.insert(table.qualified_name(), columns);
        self.tables.push(table);
        self
    }

    /// Columns of `table`, by qualified name first, then bare name.
    pub fn columns_for(&self, table: &TableRef) -> Option<&[ColumnInfo]> {
        self.columns
            .get(&table.qualified_name())
            .or_else(|| self.columns.get(&table.table_name))
            .map(Vec::as_slice)
    }

    /// Tables in `schema`; an empty schema name matches every table.
    pub fn tables_in(&self, schema: &str) -> Vec<TableInfo> {
        self.tables
            .iter()
            .filter(|t| schema.is_empty() || t.schema_name() == schema)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Discovery for SchemaSnapshot {
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableInfo>> {
        Ok(self.tables_in(schema))
    }

    async fn list_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>> {
        Ok(self.columns_for(table).map(<[ColumnInfo]>::to_vec).unwrap_or_default())
    }

    async fn test_connection(&self) -> bool {
        true
    }
}

/// Fixed schema of every MongoDB collection table.
pub fn mongodb_columns() -> Vec<ColumnInfo> {
    vec![
        ColumnInfo::new("_id", "jsonb", 1).primary_key(),
        ColumnInfo::new("payload", "jsonb", 2),
    ]
}
