//! Pipeline configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::schema::{TableColumnConfig, TableInfo};
use crate::ddl::include::MetadataInclude;
use crate::selection::TableSelection;

use super::sink::SinkConfig;
use super::source::SourceConfig;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upstream system to capture from.
    pub source: SourceConfig,

    /// Which discovered tables get a CDC table.
    #[serde(default)]
    pub tables: TableSelection,

    /// Column configuration keyed by qualified (`schema.table`) or bare table name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, TableColumnConfig>,

    /// Options applied to every generated table.
    #[serde(default)]
    pub table_options: TableOptions,

    /// Sinks fed from the generated tables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sinks: Vec<SinkSpec>,

    /// Discovery behaviour.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl PipelineConfig {
    /// Column configuration for a table, by qualified name first, then bare name.
    pub fn column_config(&self, table: &TableInfo) -> Option<&TableColumnConfig> {
        self.columns
            .get(&table.qualified_name())
            .or_else(|| self.columns.get(table.table_name()))
    }
}

/// Options shared by every CDC-backed table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// RisingWave schema for generated tables (default: public).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,

    /// Metadata columns added with INCLUDE.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<MetadataInclude>,

    /// Run the initial snapshot (default: true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,

    /// Barrier interval between snapshot batches (default: 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_interval: Option<u32>,

    /// Rows per snapshot batch (default: 1000).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_batch_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backfill_num_rows_per_split: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backfill_parallelism: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backfill_as_even_splits: Option<bool>,

    /// Spell out every discovered column instead of `(*)` when no column list is configured.
    #[serde(default)]
    pub expand_columns: bool,
}

/// One sink definition and the tables (or query) feeding it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkSpec {
    pub sink: SinkConfig,

    /// RisingWave tables to sink; more than one fans out into one sink per table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub from: Vec<String>,

    /// Query to sink instead of a table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Per-table queries replacing `FROM <table>` for fanned-out sinks.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<String, String>,
}

/// Discovery configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Concurrent column fetches (default: 4).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl DiscoveryConfig {
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(4)
    }
}

/// A credential whose Debug output is redacted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub(crate) fn default_true() -> bool {
    true
}
