//! Source connector configuration.
//!
//! [`SourceConfig`] is a tagged union keyed by `type:` in YAML. Each variant
//! carries only the fields its connector understands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dialect::SourceDialect;

use super::types::Secret;

/// Upstream system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    #[serde(alias = "postgresql")]
    Postgres(PostgresSourceConfig),
    #[serde(alias = "mariadb")]
    Mysql(MysqlSourceConfig),
    #[serde(rename = "sqlserver", alias = "mssql", alias = "sql_server")]
    SqlServer(SqlServerSourceConfig),
    #[serde(rename = "mongodb", alias = "mongo")]
    MongoDb(MongoDbSourceConfig),
    Kafka(KafkaSourceConfig),
}

impl SourceConfig {
    /// Connector family name.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Postgres(_) => "postgres",
            SourceConfig::Mysql(_) => "mysql",
            SourceConfig::SqlServer(_) => "sqlserver",
            SourceConfig::MongoDb(_) => "mongodb",
            SourceConfig::Kafka(_) => "kafka",
        }
    }

    /// Relational dialect with a type mapping table, if any.
    pub fn dialect(&self) -> Option<SourceDialect> {
        match self {
            SourceConfig::Postgres(_) => Some(SourceDialect::Postgres),
            SourceConfig::Mysql(_) => Some(SourceDialect::Mysql),
            SourceConfig::SqlServer(_) => Some(SourceDialect::SqlServer),
            SourceConfig::MongoDb(_) | SourceConfig::Kafka(_) => None,
        }
    }

    /// Explicitly configured name.
    pub fn name(&self) -> Option<&str> {
        match self {
            SourceConfig::Postgres(c) => c.name.as_deref(),
            SourceConfig::Mysql(c) => c.name.as_deref(),
            SourceConfig::SqlServer(c) => c.name.as_deref(),
            SourceConfig::MongoDb(c) => c.name.as_deref(),
            SourceConfig::Kafka(c) => c.name.as_deref(),
        }
    }

    /// Schema that bare table names resolve into and discovery lists.
    pub fn default_schema(&self) -> String {
        match self {
            SourceConfig::Postgres(c) => c.schema.clone(),
            SourceConfig::Mysql(c) => c.database.clone(),
            SourceConfig::SqlServer(c) => c.schema.clone(),
            SourceConfig::MongoDb(c) => c
                .database_name
                .clone()
                .or_else(|| c.databases().into_iter().next())
                .unwrap_or_default(),
            SourceConfig::Kafka(_) => String::new(),
        }
    }

    /// Schemas discovery lists: every database named by a MongoDB source,
    /// otherwise the default schema.
    pub fn discovery_schemas(&self) -> Vec<String> {
        match self {
            SourceConfig::MongoDb(c) => c.databases(),
            SourceConfig::Kafka(_) => Vec::new(),
            other => vec![other.default_schema()],
        }
    }
}

/// PostgreSQL SSL modes accepted by the CDC connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PgSslMode {
    Disabled,
    Preferred,
    Required,
    VerifyCa,
    VerifyFull,
}

impl PgSslMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PgSslMode::Disabled => "disabled",
            PgSslMode::Preferred => "preferred",
            PgSslMode::Required => "required",
            PgSslMode::VerifyCa => "verify-ca",
            PgSslMode::VerifyFull => "verify-full",
        }
    }
}

/// PostgreSQL CDC source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub hostname: String,

    /// Database port (default: 5432).
    #[serde(default = "default_pg_port")]
    pub port: u16,

    pub username: String,

    #[serde(default)]
    pub password: Secret,

    pub database: String,

    /// Source schema (default: "public").
    #[serde(default = "default_public_schema")]
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<PgSslMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_root_cert: Option<String>,

    /// Replication slot name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_create_enable: Option<bool>,

    /// Replicate upstream DDL (emitted only when enabled).
    #[serde(default)]
    pub auto_schema_change: bool,

    /// Passed through as `debezium.<key>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debezium: BTreeMap<String, String>,

    /// Passed through verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// MySQL SSL modes accepted by the CDC connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MysqlSslMode {
    #[default]
    Disabled,
    Preferred,
    Required,
    VerifyCa,
    VerifyIdentity,
}

impl MysqlSslMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MysqlSslMode::Disabled => "disabled",
            MysqlSslMode::Preferred => "preferred",
            MysqlSslMode::Required => "required",
            MysqlSslMode::VerifyCa => "verify_ca",
            MysqlSslMode::VerifyIdentity => "verify_identity",
        }
    }

    /// Modes that check the server certificate against a CA.
    pub fn verifies_server(self) -> bool {
        matches!(self, MysqlSslMode::VerifyCa | MysqlSslMode::VerifyIdentity)
    }
}

pub const MYSQL_DEFAULT_CONNECT_TIMEOUT: u32 = 30;
pub const MYSQL_DEFAULT_HEARTBEAT_INTERVAL: u32 = 10_000;
pub const MYSQL_DEFAULT_CHARSET: &str = "utf8";
pub const MYSQL_DEFAULT_TIME_ZONE: &str = "+00:00";

/// MySQL CDC source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub hostname: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    pub username: String,

    #[serde(default)]
    pub password: Secret,

    pub database: String,

    /// Replication client id; must be unique among replicas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u32>,

    #[serde(default)]
    pub auto_schema_change: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactional: Option<bool>,

    #[serde(default)]
    pub ssl_mode: MysqlSslMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_ca: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<String>,

    /// Seconds (default: 30).
    #[serde(default = "default_mysql_connect_timeout")]
    pub connect_timeout: u32,

    /// Milliseconds (default: 10000).
    #[serde(default = "default_mysql_heartbeat_interval")]
    pub heartbeat_interval: u32,

    #[serde(default = "default_mysql_charset")]
    pub charset: String,

    #[serde(default = "default_mysql_time_zone")]
    pub server_time_zone: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debezium: BTreeMap<String, String>,
}

/// SQL Server CDC source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlServerSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub hostname: String,

    /// Database port (default: 1433).
    #[serde(default = "default_mssql_port")]
    pub port: u16,

    pub username: String,

    #[serde(default)]
    pub password: Secret,

    pub database: String,

    /// Source schema (default: "dbo").
    #[serde(default = "default_dbo_schema")]
    pub schema: String,

    /// Encrypt the connection (emitted only when enabled).
    #[serde(default)]
    pub encrypt: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub debezium: BTreeMap<String, String>,
}

/// MongoDB change stream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDbSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `mongodb://` or `mongodb+srv://` connection string.
    pub mongodb_url: Secret,

    /// Comma-separated `db.collection` patterns (`db.*` allowed).
    pub collection_name: String,

    /// Database whose collections are discovered; defaults to the first one in `collection_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
}

impl MongoDbSourceConfig {
    /// Non-empty `collection_name` entries, trimmed.
    pub fn collection_patterns(&self) -> impl Iterator<Item = &str> {
        self.collection_name
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Distinct databases named in `collection_name`, in order.
    pub fn databases(&self) -> Vec<String> {
        let mut dbs: Vec<String> = Vec::new();
        for entry in self.collection_patterns() {
            let db = entry.split_once('.').map(|(db, _)| db).unwrap_or(entry);
            if !db.is_empty() && !dbs.iter().any(|d| d == db) {
                dbs.push(db.to_string());
            }
        }
        dbs
    }
}

/// Whether a Kafka topic becomes a table or a plain source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KafkaRelation {
    #[default]
    Table,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupMode {
    #[default]
    Earliest,
    Latest,
    Timestamp,
}

impl StartupMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StartupMode::Earliest => "earliest",
            StartupMode::Latest => "latest",
            StartupMode::Timestamp => "timestamp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityProtocol {
    #[default]
    Plaintext,
    Ssl,
    SaslPlaintext,
    SaslSsl,
}

impl SecurityProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityProtocol::Plaintext => "PLAINTEXT",
            SecurityProtocol::Ssl => "SSL",
            SecurityProtocol::SaslPlaintext => "SASL_PLAINTEXT",
            SecurityProtocol::SaslSsl => "SASL_SSL",
        }
    }

    pub fn uses_sasl(self) -> bool {
        matches!(self, SecurityProtocol::SaslPlaintext | SecurityProtocol::SaslSsl)
    }
}

/// `FORMAT` of a Kafka message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageFormat {
    #[default]
    Plain,
    Upsert,
    Debezium,
}

impl MessageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageFormat::Plain => "PLAIN",
            MessageFormat::Upsert => "UPSERT",
            MessageFormat::Debezium => "DEBEZIUM",
        }
    }
}

/// `ENCODE` of a Kafka message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageEncode {
    #[default]
    Json,
    Avro,
    Protobuf,
    Csv,
    Bytes,
}

impl MessageEncode {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageEncode::Json => "JSON",
            MessageEncode::Avro => "AVRO",
            MessageEncode::Protobuf => "PROTOBUF",
            MessageEncode::Csv => "CSV",
            MessageEncode::Bytes => "BYTES",
        }
    }

    /// Encodings whose schema comes from a registry or schema file.
    pub fn has_external_schema(self) -> bool {
        matches!(self, MessageEncode::Avro | MessageEncode::Protobuf)
    }
}

/// A column declared for a Kafka topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaColumn {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub primary_key: bool,
}

/// Kafka topic source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub topic: String,

    /// Comma-separated `host:port` list.
    pub bootstrap_servers: String,

    #[serde(default)]
    pub relation: KafkaRelation,

    #[serde(default)]
    pub scan_startup_mode: StartupMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_startup_timestamp_millis: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer_group_id: Option<String>,

    #[serde(default)]
    pub security_protocol: SecurityProtocol,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_mechanism: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sasl_password: Option<Secret>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_ca_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_key_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_key_password: Option<Secret>,

    #[serde(default)]
    pub format: MessageFormat,

    #[serde(default)]
    pub encode: MessageEncode,

    /// `KEY ENCODE` for the message key (e.g. TEXT, JSON).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_encode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_registry_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_registry_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_registry_password: Option<Secret>,

    /// Avro record or Protobuf message name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Protobuf descriptor location (`s3://`, `https://`, `file://`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_without_header: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_delimiter: Option<String>,

    /// Declared columns; empty means the schema comes from the encoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<KafkaColumn>,

    /// Passed through as `properties.<key>`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_mssql_port() -> u16 {
    1433
}

fn default_public_schema() -> String {
    "public".to_string()
}

fn default_dbo_schema() -> String {
    "dbo".to_string()
}

fn default_mysql_connect_timeout() -> u32 {
    MYSQL_DEFAULT_CONNECT_TIMEOUT
}

fn default_mysql_heartbeat_interval() -> u32 {
    MYSQL_DEFAULT_HEARTBEAT_INTERVAL
}

fn default_mysql_charset() -> String {
    MYSQL_DEFAULT_CHARSET.to_string()
}

fn default_mysql_time_zone() -> String {
    MYSQL_DEFAULT_TIME_ZONE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_defaults() {
        let yaml = r#"
type: postgres
hostname: db
username: rw
password: secret
database: shop
"#;
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        let SourceConfig::Postgres(pg) = &config else {
            panic!("expected postgres source");
        };
        assert_eq!(pg.port, 5432);
        assert_eq!(pg.schema, "public");
        assert!(!pg.auto_schema_change);
        assert_eq!(config.dialect(), Some(SourceDialect::Postgres));
        assert_eq!(config.default_schema(), "public");
    }

    #[test]
    fn test_sqlserver_alias_and_defaults() {
        let yaml = "type: mssql\nhostname: h\nusername: sa\ndatabase: erp\n";
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.kind(), "sqlserver");
        assert_eq!(config.default_schema(), "dbo");
    }

    #[test]
    fn test_invalid_pg_ssl_mode_rejected() {
        let yaml = "type: postgres\nhostname: h\nusername: u\ndatabase: d\nssl_mode: sometimes\n";
        assert!(serde_yaml::from_str::<SourceConfig>(yaml).is_err());

        let yaml = "type: postgres\nhostname: h\nusername: u\ndatabase: d\nssl_mode: verify-ca\n";
        let SourceConfig::Postgres(pg) = serde_yaml::from_str::<SourceConfig>(yaml).unwrap() else {
            panic!("expected postgres source");
        };
        assert_eq!(pg.ssl_mode, Some(PgSslMode::VerifyCa));
    }

    #[test]
    fn test_mongodb_databases() {
        let yaml = "type: mongodb\nmongodb_url: mongodb://m:27017\ncollection_name: shop.orders, shop.users, crm.*\n";
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        let SourceConfig::MongoDb(mongo) = &config else {
            panic!("expected mongodb source");
        };
        assert_eq!(mongo.databases(), vec!["shop", "crm"]);
        assert_eq!(config.default_schema(), "shop");
        assert_eq!(config.discovery_schemas(), vec!["shop", "crm"]);
        assert_eq!(
            mongo.collection_patterns().collect::<Vec<_>>(),
            vec!["shop.orders", "shop.users", "crm.*"]
        );
    }

    #[test]
    fn test_kafka_enums() {
        let yaml = r#"
type: kafka
topic: orders
bootstrap_servers: broker:9092
format: UPSERT
encode: AVRO
security_protocol: SASL_SSL
scan_startup_mode: latest
"#;
        let SourceConfig::Kafka(kafka) = serde_yaml::from_str::<SourceConfig>(yaml).unwrap() else {
            panic!("expected kafka source");
        };
        assert_eq!(kafka.format, MessageFormat::Upsert);
        assert_eq!(kafka.encode, MessageEncode::Avro);
        assert!(kafka.security_protocol.uses_sasl());
        assert_eq!(kafka.relation, KafkaRelation::Table);
    }

    #[test]
    fn test_password_not_in_debug() {
        let yaml = "type: mysql\nhostname: h\nusername: u\npassword: hunter2\ndatabase: d\n";
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
