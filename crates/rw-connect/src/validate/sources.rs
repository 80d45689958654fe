//! Source connector rules.
//!
//! A [`ValidatedSource`] can only be obtained from [`validate_source`], and
//! DDL synthesis only accepts that type.

use crate::config::{
    KafkaRelation, KafkaSourceConfig, MessageEncode, MessageFormat, MongoDbSourceConfig, MysqlSourceConfig,
    SourceConfig, StartupMode,
};
use crate::core::identifier::validate_identifier;
use crate::ddl::naming::source_name;

use super::{CheckResult, ValidationReport};

/// A source config that passed [`validate_source`], with its resolved name.
#[derive(Debug, Clone)]
pub struct ValidatedSource {
    config: SourceConfig,
    name: String,
}

impl ValidatedSource {
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Explicit or generated object name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Check a source config and resolve its name.
pub fn validate_source(config: &SourceConfig) -> CheckResult<ValidatedSource> {
    let mut report = ValidationReport::default();

    if let Some(name) = config.name() {
        if let Err(e) = validate_identifier(name) {
            report.fail("source.name", e.to_string());
        }
    }

    match config {
        SourceConfig::Postgres(c) => {
            check_connection(&mut report, &c.hostname, c.port, &c.username, &c.database);
            if c.schema.is_empty() {
                report.fail("source.schema", "schema is required");
            }
            if c.password.is_empty() {
                report.caution("source.password", "no password configured");
            }
        }
        SourceConfig::Mysql(c) => {
            check_connection(&mut report, &c.hostname, c.port, &c.username, &c.database);
            check_mysql(&mut report, c);
        }
        SourceConfig::SqlServer(c) => {
            check_connection(&mut report, &c.hostname, c.port, &c.username, &c.database);
            if c.password.is_empty() {
                report.caution("source.password", "no password configured");
            }
        }
        SourceConfig::MongoDb(c) => check_mongodb(&mut report, c),
        SourceConfig::Kafka(c) => check_kafka(&mut report, c),
    }

    report.finish(|| ValidatedSource {
        config: config.clone(),
        name: source_name(config),
    })
}

fn check_connection(report: &mut ValidationReport, hostname: &str, port: u16, username: &str, database: &str) {
    if hostname.is_empty() {
        report.fail("source.hostname", "hostname is required");
    }
    if port == 0 {
        report.fail("source.port", "port must be between 1 and 65535");
    }
    if username.is_empty() {
        report.fail("source.username", "username is required");
    }
    if database.is_empty() {
        report.fail("source.database", "database is required");
    }
}

fn check_mysql(report: &mut ValidationReport, c: &MysqlSourceConfig) {
    if c.ssl_mode.verifies_server() && c.ssl_ca.as_deref().map_or(true, str::is_empty) {
        report.fail(
            "source.ssl_ca",
            format!("ssl_ca is required when ssl_mode is {}", c.ssl_mode.as_str()),
        );
    }
    if c.ssl_cert.is_some() != c.ssl_key.is_some() {
        report.fail("source.ssl_cert", "ssl_cert and ssl_key must be set together");
    }
    if c.connect_timeout == 0 {
        report.fail("source.connect_timeout", "connect_timeout must be at least 1");
    }
    if c.server_id.is_none() {
        report.caution(
            "source.server_id",
            "no server_id set; RisingWave will pick one, which may collide with other replicas",
        );
    }
}

fn check_mongodb(report: &mut ValidationReport, c: &MongoDbSourceConfig) {
    let url = c.mongodb_url.expose();
    if !(url.starts_with("mongodb://") || url.starts_with("mongodb+srv://")) {
        report.fail(
            "source.mongodb_url",
            "mongodb_url must start with mongodb:// or mongodb+srv://",
        );
    }
    if c.collection_name.trim().is_empty() {
        report.fail("source.collection_name", "collection_name is required");
        return;
    }
    for entry in c.collection_name.split(',').map(str::trim) {
        match entry.split_once('.') {
            Some((db, coll)) if !db.is_empty() && !coll.is_empty() => {}
            _ => report.fail(
                "source.collection_name",
                format!("'{}' must have the form db.collection or db.*", entry),
            ),
        }
    }
}

fn check_kafka(report: &mut ValidationReport, c: &KafkaSourceConfig) {
    if c.topic.is_empty() {
        report.fail("source.topic", "topic is required");
    }
    if c.bootstrap_servers.trim().is_empty() {
        report.fail("source.bootstrap_servers", "bootstrap_servers is required");
    }

    if c.scan_startup_mode == StartupMode::Timestamp && c.scan_startup_timestamp_millis.is_none() {
        report.fail(
            "source.scan_startup_timestamp_millis",
            "scan_startup_timestamp_millis is required when scan_startup_mode is timestamp",
        );
    }

    if c.security_protocol.uses_sasl() {
        if c.sasl_mechanism.as_deref().map_or(true, str::is_empty) {
            report.fail(
                "source.sasl_mechanism",
                format!("sasl_mechanism is required for {}", c.security_protocol.as_str()),
            );
        }
    } else if c.sasl_username.is_some() || c.sasl_password.is_some() {
        report.caution(
            "source.security_protocol",
            "SASL credentials are ignored without a SASL security protocol",
        );
    }

    let has_registry = c.schema_registry_url.as_deref().is_some_and(|u| !u.is_empty());
    match c.encode {
        MessageEncode::Avro if !has_registry => {
            report.fail("source.schema_registry_url", "AVRO encoding requires schema_registry_url");
        }
        MessageEncode::Protobuf => {
            if !has_registry && c.schema_location.is_none() {
                report.fail(
                    "source.schema_location",
                    "PROTOBUF encoding requires schema_registry_url or schema_location",
                );
            }
            if c.message.is_none() {
                report.fail("source.message", "PROTOBUF encoding requires message");
            }
        }
        _ => {}
    }

    if c.format == MessageFormat::Upsert
        && !matches!(c.encode, MessageEncode::Json | MessageEncode::Avro | MessageEncode::Protobuf)
    {
        report.fail(
            "source.encode",
            format!("FORMAT UPSERT does not support ENCODE {}", c.encode.as_str()),
        );
    }
    if c.format == MessageFormat::Upsert && c.relation == KafkaRelation::Source {
        report.fail("source.relation", "FORMAT UPSERT requires relation: table");
    }
    if c.format == MessageFormat::Debezium && c.encode != MessageEncode::Json && c.encode != MessageEncode::Avro {
        report.fail(
            "source.encode",
            format!("FORMAT DEBEZIUM does not support ENCODE {}", c.encode.as_str()),
        );
    }

    if c.csv_delimiter.is_some() && c.encode != MessageEncode::Csv {
        report.caution("source.csv_delimiter", "csv_delimiter only applies to CSV encoding");
    }

    let mut seen = std::collections::BTreeSet::new();
    for column in &c.columns {
        if column.name.is_empty() || column.data_type.is_empty() {
            report.fail("source.columns", "every column needs a name and a type");
        } else if !seen.insert(column.name.as_str()) {
            report.fail(format!("source.columns.{}", column.name), "column declared twice");
        }
    }
}
