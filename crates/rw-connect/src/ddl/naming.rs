//! Object name derivation.
//!
//! Names are pure functions of configuration: an explicit `name` wins,
//! otherwise one is built from the connector type and its primary
//! identifier (database, topic, bucket, index).

use crate::config::{SinkConfig, SourceConfig};
use crate::core::identifier::sanitize_name;

/// Name of the CREATE SOURCE (or standalone Kafka object).
pub fn source_name(config: &SourceConfig) -> String {
    config
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| auto_source_name(config))
}

/// Generated source name.
pub fn auto_source_name(config: &SourceConfig) -> String {
    match config {
        SourceConfig::Postgres(c) => {
            let mut name = format!("postgres_cdc_{}", sanitize_name(&c.database));
            if c.schema != "public" {
                name.push('_');
                name.push_str(&sanitize_name(&c.schema));
            }
            name
        }
        SourceConfig::Mysql(c) => format!("mysql_cdc_{}", sanitize_name(&c.database)),
        SourceConfig::SqlServer(c) => format!("sqlserver_cdc_{}", sanitize_name(&c.database)),
        SourceConfig::MongoDb(c) => {
            let dbs = c.databases();
            match dbs.first() {
                None => "mongodb_cdc_source".to_string(),
                Some(first) if dbs.len() > 1 => format!("mongodb_cdc_{}_multi", sanitize_name(first)),
                Some(first) => format!("mongodb_cdc_{}", sanitize_name(first)),
            }
        }
        SourceConfig::Kafka(c) => sanitize_name(&c.topic),
    }
}

/// Name of the CREATE SINK, without schema qualification.
pub fn sink_name(config: &SinkConfig) -> String {
    config
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| auto_sink_name(config))
}

/// Generated sink name, `<type>_<identifier>_sink`.
pub fn auto_sink_name(config: &SinkConfig) -> String {
    let identifier = match config {
        SinkConfig::Iceberg(c) => non_empty(&c.database_name),
        SinkConfig::Postgres(c) => non_empty(&c.database),
        SinkConfig::S3(c) => non_empty(&c.bucket),
        SinkConfig::Elasticsearch(c) => {
            match (
                c.index.as_deref().and_then(non_empty),
                c.index_column.as_deref().and_then(non_empty),
            ) {
                (Some(index), _) => Some(index),
                (None, Some(column)) => Some(format!("dynamic_{}", column)),
                (None, None) => None,
            }
        }
    };

    match identifier {
        Some(id) => format!("{}_{}_sink", config.kind(), sanitize_name(&id)),
        None => format!("{}_sink", config.kind()),
    }
}

/// Name of one sink in a fan-out over several tables.
pub fn fan_out_name(base: &str, table: &str) -> String {
    format!("{}_{}", base, table.replace('.', "_"))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}
