//! Sink connector configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::{default_true, Secret};

/// Destination configuration, keyed by `type:` in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    Iceberg(IcebergSinkConfig),
    #[serde(alias = "postgresql")]
    Postgres(PostgresSinkConfig),
    #[serde(alias = "es")]
    Elasticsearch(ElasticsearchSinkConfig),
    S3(S3SinkConfig),
}

impl SinkConfig {
    /// Connector family name.
    pub fn kind(&self) -> &'static str {
        match self {
            SinkConfig::Iceberg(_) => "iceberg",
            SinkConfig::Postgres(_) => "postgres",
            SinkConfig::Elasticsearch(_) => "elasticsearch",
            SinkConfig::S3(_) => "s3",
        }
    }

    /// Explicitly configured name.
    pub fn name(&self) -> Option<&str> {
        match self {
            SinkConfig::Iceberg(c) => c.name.as_deref(),
            SinkConfig::Postgres(c) => c.name.as_deref(),
            SinkConfig::Elasticsearch(c) => c.name.as_deref(),
            SinkConfig::S3(c) => c.name.as_deref(),
        }
    }

    pub fn set_name(&mut self, name: String) {
        let slot = match self {
            SinkConfig::Iceberg(c) => &mut c.name,
            SinkConfig::Postgres(c) => &mut c.name,
            SinkConfig::Elasticsearch(c) => &mut c.name,
            SinkConfig::S3(c) => &mut c.name,
        };
        *slot = Some(name);
    }

    /// RisingWave schema the sink is created in.
    pub fn schema(&self) -> Option<&str> {
        match self {
            SinkConfig::Iceberg(c) => c.schema.as_deref(),
            SinkConfig::Postgres(c) => c.schema.as_deref(),
            SinkConfig::Elasticsearch(c) => c.schema.as_deref(),
            SinkConfig::S3(c) => c.schema.as_deref(),
        }
    }
}

/// How a sink applies changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkMode {
    #[default]
    AppendOnly,
    Upsert,
}

impl SinkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SinkMode::AppendOnly => "append-only",
            SinkMode::Upsert => "upsert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogType {
    Storage,
    Rest,
    Glue,
    Jdbc,
}

impl CatalogType {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogType::Storage => "storage",
            CatalogType::Rest => "rest",
            CatalogType::Glue => "glue",
            CatalogType::Jdbc => "jdbc",
        }
    }
}

pub const ICEBERG_DEFAULT_COMMIT_CHECKPOINT_INTERVAL: i64 = 60;
pub const ICEBERG_DEFAULT_COMMIT_RETRY_NUM: i64 = 8;

/// Iceberg table sink on object storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IcebergSinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub mode: SinkMode,

    /// `s3://`, `s3a://`, `gs://`, `azblob://`, `abfss://` or an S3 Tables ARN.
    #[serde(default)]
    pub warehouse_path: String,

    #[serde(default)]
    pub database_name: String,

    #[serde(default)]
    pub table_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_type: Option<CatalogType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_credential: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_jdbc_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_jdbc_password: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_signing_region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_signing_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_sigv4_enabled: Option<bool>,

    /// Comma-separated key columns (required for upsert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_append_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_access_key: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_secret_key: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_path_style_access: Option<bool>,

    /// Load credentials from the environment instead of the statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_config_load: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs_credential: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azblob_account_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azblob_account_key: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azblob_endpoint_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exactly_once: Option<bool>,

    /// Checkpoints between commits (default: 60).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_checkpoint_interval: Option<i64>,

    /// Default: 8.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_retry_num: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_table_if_not_exists: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_compaction: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction_interval_sec: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_snapshot_expiration: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Relational sink into PostgreSQL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostgresSinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub mode: SinkMode,

    #[serde(default)]
    pub hostname: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: Secret,

    #[serde(default)]
    pub database: String,

    /// Target schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub target_schema: String,

    /// Target table; defaults to the sink name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Comma-separated key columns (required for upsert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Search index sink into Elasticsearch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElasticsearchSinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub url: String,

    /// Fixed index name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    /// Column holding the index name per row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_column: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,

    /// Joins composite key values into the document id (default: ",").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_column: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on_conflict: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size_kb: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_num_messages: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_requests: Option<i64>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    #[default]
    Plain,
    Upsert,
    Debezium,
}

impl FileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Plain => "PLAIN",
            FileFormat::Upsert => "UPSERT",
            FileFormat::Debezium => "DEBEZIUM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileEncode {
    #[default]
    Parquet,
    Json,
    Csv,
}

impl FileEncode {
    pub fn as_str(self) -> &'static str {
        match self {
            FileEncode::Parquet => "PARQUET",
            FileEncode::Json => "JSON",
            FileEncode::Csv => "CSV",
        }
    }
}

/// File sink writing objects to an S3 bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3SinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub mode: SinkMode,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub bucket: String,

    /// Object key prefix.
    #[serde(default)]
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role: Option<String>,

    #[serde(default)]
    pub format: FileFormat,

    #[serde(default)]
    pub encode: FileEncode,

    /// Write changes as inserts (default: true).
    #[serde(default = "default_true")]
    pub force_append_only: bool,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_public_schema() -> String {
    "public".to_string()
}
