//! `INCLUDE` clauses for connector metadata columns.
//!
//! Clauses are emitted in a fixed order (the declaration order of
//! [`MetadataColumn`]), one per line, with duplicates removed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::identifier::quote_ident;
use crate::validate::ValidationReport;

/// Metadata a connector can expose as an extra column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataColumn {
    Key,
    Offset,
    Partition,
    Timestamp,
    Headers,
    Payload,
    DatabaseName,
    SchemaName,
    TableName,
    CollectionName,
}

impl MetadataColumn {
    /// Keyword used after `INCLUDE`.
    pub fn keyword(self) -> &'static str {
        match self {
            MetadataColumn::Key => "key",
            MetadataColumn::Offset => "offset",
            MetadataColumn::Partition => "partition",
            MetadataColumn::Timestamp => "timestamp",
            MetadataColumn::Headers => "header",
            MetadataColumn::Payload => "payload",
            MetadataColumn::DatabaseName => "database_name",
            MetadataColumn::SchemaName => "schema_name",
            MetadataColumn::TableName => "table_name",
            MetadataColumn::CollectionName => "collection_name",
        }
    }
}

/// One requested metadata column with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataInclude {
    pub column: MetadataColumn,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl From<MetadataColumn> for MetadataInclude {
    fn from(column: MetadataColumn) -> Self {
        Self { column, alias: None }
    }
}

/// The connector an INCLUDE list is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeTarget {
    Postgres,
    Mysql,
    SqlServer,
    MongoDb,
    Kafka { upsert: bool },
}

impl IncludeTarget {
    fn name(self) -> &'static str {
        match self {
            IncludeTarget::Postgres => "postgres",
            IncludeTarget::Mysql => "mysql",
            IncludeTarget::SqlServer => "sqlserver",
            IncludeTarget::MongoDb => "mongodb",
            IncludeTarget::Kafka { .. } => "kafka",
        }
    }

    pub fn supports(self, column: MetadataColumn) -> bool {
        use MetadataColumn::*;
        match self {
            IncludeTarget::Postgres | IncludeTarget::SqlServer => {
                matches!(column, Timestamp | DatabaseName | SchemaName | TableName)
            }
            IncludeTarget::Mysql => matches!(column, Timestamp | DatabaseName | TableName),
            IncludeTarget::MongoDb => matches!(column, Timestamp | DatabaseName | CollectionName),
            IncludeTarget::Kafka { .. } => {
                matches!(column, Key | Offset | Partition | Timestamp | Headers | Payload)
            }
        }
    }

    /// Column name used when no alias is configured.
    pub fn default_alias(self, column: MetadataColumn) -> &'static str {
        match (self, column) {
            (IncludeTarget::Kafka { upsert: true }, MetadataColumn::Key) => "rw_key",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Key) => "kafka_key",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Offset) => "kafka_offset",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Partition) => "kafka_partition",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Timestamp) => "kafka_timestamp",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Headers) => "kafka_headers",
            (IncludeTarget::Kafka { .. }, MetadataColumn::Payload) => "kafka_payload",
            (_, MetadataColumn::Timestamp) => "commit_ts",
            (_, other) => other.keyword(),
        }
    }
}

/// Resolve includes for `target` into `(column, alias)` pairs in canonical order.
pub fn resolve_includes(
    includes: &[MetadataInclude],
    target: IncludeTarget,
) -> Result<Vec<(MetadataColumn, String)>, ValidationReport> {
    let mut report = ValidationReport::default();
    let mut resolved: BTreeMap<MetadataColumn, String> = BTreeMap::new();

    for include in includes {
        if !target.supports(include.column) {
            report.fail(
                "table_options.includes",
                format!(
                    "'{}' is not available for {} sources",
                    include.column.keyword(),
                    target.name()
                ),
            );
            continue;
        }
        let alias = include
            .alias
            .clone()
            .unwrap_or_else(|| target.default_alias(include.column).to_string());
        resolved.entry(include.column).or_insert(alias);
    }

    if report.is_valid() {
        Ok(resolved.into_iter().collect())
    } else {
        Err(report)
    }
}

/// Render `INCLUDE <keyword> AS <alias>` lines.
pub fn render_includes(
    includes: &[MetadataInclude],
    target: IncludeTarget,
) -> Result<Vec<String>, ValidationReport> {
    let resolved = resolve_includes(includes, target)?;
    let mut report = ValidationReport::default();
    let mut lines = Vec::with_capacity(resolved.len());

    for (column, alias) in resolved {
        match quote_ident(&alias) {
            Ok(alias) => lines.push(format!("INCLUDE {} AS {}", column.keyword(), alias)),
            Err(e) => report.fail("table_options.includes", e.to_string()),
        }
    }

    if report.is_valid() {
        Ok(lines)
    } else {
        Err(report)
    }
}
