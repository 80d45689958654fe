//! Standalone Kafka objects.
//!
//! A topic becomes either a `CREATE TABLE` (rows stored in RisingWave) or a
//! `CREATE SOURCE` (read on demand), chosen by `relation:`. Both carry the
//! connector properties directly, followed by a `FORMAT ... ENCODE ...` clause.

use crate::config::{KafkaRelation, KafkaSourceConfig, MessageEncode, MessageFormat, Secret, SourceConfig, StartupMode};
use crate::core::identifier::quote_ident;
use crate::error::{ConnectError, Result};
use crate::validate::{ValidatedSource, ValidationReport};

use super::format::FormatClause;
use super::include::{resolve_includes, IncludeTarget, MetadataColumn, MetadataInclude};
use super::with_options::{WithOptions, INDENT};
use super::{column_lines, ColumnDef, Statement};

/// Build the CREATE TABLE or CREATE SOURCE statement for a Kafka topic.
pub fn build_kafka_statement(source: &ValidatedSource, includes: &[MetadataInclude]) -> Result<Statement> {
    let SourceConfig::Kafka(c) = source.config() else {
        return Err(ConnectError::Config(format!(
            "{} is not a kafka source",
            source.name()
        )));
    };

    let is_table = c.relation == KafkaRelation::Table;
    let upsert = c.format == MessageFormat::Upsert;
    let has_declared_pk = c.columns.iter().any(|col| col.primary_key);
    let needs_key_pk = upsert && is_table && !has_declared_pk;

    let mut requested = includes.to_vec();
    if needs_key_pk && !requested.iter().any(|i| i.column == MetadataColumn::Key) {
        requested.push(MetadataColumn::Key.into());
    }
    let resolved = resolve_includes(&requested, IncludeTarget::Kafka { upsert })?;

    let mut lines = declared_columns(c, &resolved)?;
    if needs_key_pk {
        if let Some((_, alias)) = resolved.iter().find(|(col, _)| *col == MetadataColumn::Key) {
            lines.push(format!("{}PRIMARY KEY ({})", INDENT, quote_ident(alias)?));
        }
    }

    let keyword = if is_table { "TABLE" } else { "SOURCE" };
    let mut sql = format!("CREATE {} IF NOT EXISTS {}", keyword, quote_ident(source.name())?);
    if !lines.is_empty() {
        sql.push_str(&format!(" (\n{}\n)", lines.join(",\n")));
    }
    for (column, alias) in &resolved {
        sql.push_str(&format!("\nINCLUDE {} AS {}", column.keyword(), quote_ident(alias)?));
    }
    sql.push('\n');
    sql.push_str(&kafka_options(c).render_block());
    sql.push(' ');
    sql.push_str(&format_clause(c).render());
    sql.push(';');

    Ok(Statement::new(source.name(), sql))
}

fn declared_columns(c: &KafkaSourceConfig, resolved: &[(MetadataColumn, String)]) -> Result<Vec<String>> {
    if !c.columns.is_empty() {
        let defs = c
            .columns
            .iter()
            .map(|col| -> Result<ColumnDef<'_>> {
                Ok(ColumnDef {
                    name: quote_ident(&col.name)?,
                    data_type: col.data_type.as_str(),
                    nullable: true,
                    primary_key: col.primary_key,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(column_lines(defs));
    }

    let has_payload = resolved.iter().any(|(col, _)| *col == MetadataColumn::Payload);
    match c.encode {
        MessageEncode::Bytes => Ok(vec![format!("{}data BYTEA", INDENT)]),
        MessageEncode::Avro | MessageEncode::Protobuf => Ok(Vec::new()),
        MessageEncode::Json | MessageEncode::Csv if has_payload => Ok(Vec::new()),
        MessageEncode::Json | MessageEncode::Csv => {
            let mut report = ValidationReport::default();
            report.fail(
                "source.columns",
                format!(
                    "ENCODE {} topics need declared columns or the payload include",
                    c.encode.as_str()
                ),
            );
            Err(report.into())
        }
    }
}

fn kafka_options(c: &KafkaSourceConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "kafka")
        .push("topic", &c.topic)
        .push("properties.bootstrap.server", &c.bootstrap_servers)
        .push("scan.startup.mode", c.scan_startup_mode.as_str());
    if c.scan_startup_mode == StartupMode::Timestamp {
        with.push_opt("scan.startup.timestamp.millis", c.scan_startup_timestamp_millis);
    }
    with.push_opt("group.id.prefix", c.consumer_group_id.as_deref())
        .push_non_default(
            "properties.security.protocol",
            c.security_protocol.as_str(),
            "PLAINTEXT",
        )
        .push_opt("properties.sasl.mechanism", c.sasl_mechanism.as_deref())
        .push_opt("properties.sasl.username", c.sasl_username.as_deref())
        .push_secret("properties.sasl.password", c.sasl_password.as_ref())
        .push_opt("properties.ssl.ca.location", c.ssl_ca_location.as_deref())
        .push_opt("properties.ssl.certificate.location", c.ssl_certificate_location.as_deref())
        .push_opt("properties.ssl.key.location", c.ssl_key_location.as_deref())
        .push_secret("properties.ssl.key.password", c.ssl_key_password.as_ref())
        .extend_prefixed("properties.", &c.properties);
    with
}

fn format_clause(c: &KafkaSourceConfig) -> FormatClause {
    let clause = FormatClause::new(c.format.as_str(), c.encode.as_str());
    let registry_password = c.schema_registry_password.as_ref().map(Secret::expose);
    let clause = match c.encode {
        MessageEncode::Avro => clause
            .param("message", c.message.as_deref())
            .param("schema.registry", c.schema_registry_url.as_deref())
            .param("schema.registry.username", c.schema_registry_username.as_deref())
            .param("schema.registry.password", registry_password),
        MessageEncode::Protobuf => clause
            .param("message", c.message.as_deref())
            .param("schema.registry", c.schema_registry_url.as_deref())
            .param("schema.registry.username", c.schema_registry_username.as_deref())
            .param("schema.registry.password", registry_password)
            .param("schema.location", c.schema_location.as_deref()),
        MessageEncode::Csv => clause
            .param("without_header", c.csv_without_header)
            .param("delimiter", c.csv_delimiter.as_deref()),
        MessageEncode::Json | MessageEncode::Bytes => clause,
    };
    clause.key_encode(c.key_encode.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_source;

    fn source(yaml: &str) -> ValidatedSource {
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        validate_source(&config).unwrap().into_inner()
    }

    fn inc(column: MetadataColumn) -> MetadataInclude {
        column.into()
    }

    #[test]
    fn test_plain_json_table_with_columns() {
        let src = source(
            r#"
type: kafka
topic: web.events
bootstrap_servers: broker:9092
columns:
  - { name: event_id, type: VARCHAR, primary_key: true }
  - { name: ts, type: TIMESTAMPTZ }
"#,
        );
        let stmt = build_kafka_statement(&src, &[inc(MetadataColumn::Offset)]).unwrap();
        assert_eq!(stmt.name, "web_events");
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS web_events (\n    event_id VARCHAR PRIMARY KEY,\n    ts TIMESTAMPTZ\n)\nINCLUDE offset AS kafka_offset\nWITH (\n    connector='kafka',\n    topic='web.events',\n    properties.bootstrap.server='broker:9092',\n    scan.startup.mode='earliest'\n) FORMAT PLAIN ENCODE JSON;"
        );
    }

    #[test]
    fn test_upsert_adds_key_primary_key() {
        let src = source(
            r#"
type: kafka
topic: users
bootstrap_servers: broker:9092
format: UPSERT
encode: AVRO
schema_registry_url: http://registry:8081
key_encode: TEXT
"#,
        );
        let stmt = build_kafka_statement(&src, &[]).unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS users (\n    PRIMARY KEY (rw_key)\n)\nINCLUDE key AS rw_key\nWITH (\n    connector='kafka',\n    topic='users',\n    properties.bootstrap.server='broker:9092',\n    scan.startup.mode='earliest'\n) FORMAT UPSERT ENCODE AVRO (\n    schema.registry = 'http://registry:8081'\n) KEY ENCODE TEXT;"
        );
    }

    #[test]
    fn test_source_relation_and_security() {
        let src = source(
            r#"
type: kafka
name: clicks_src
relation: source
topic: clicks
bootstrap_servers: b1:9092,b2:9092
scan_startup_mode: timestamp
scan_startup_timestamp_millis: 1700000000000
consumer_group_id: rw-clicks
security_protocol: SASL_SSL
sasl_mechanism: SCRAM-SHA-512
sasl_username: rw
sasl_password: "s'cret"
encode: BYTES
properties:
  fetch.max.bytes: "1048576"
"#,
        );
        let sql = build_kafka_statement(&src, &[inc(MetadataColumn::Partition)]).unwrap().sql;
        assert!(sql.starts_with("CREATE SOURCE IF NOT EXISTS clicks_src (\n    data BYTEA\n)\nINCLUDE partition AS kafka_partition\nWITH (\n"));
        assert!(sql.contains("    scan.startup.timestamp.millis='1700000000000',\n"));
        assert!(sql.contains("    group.id.prefix='rw-clicks',\n"));
        assert!(sql.contains("    properties.security.protocol='SASL_SSL',\n"));
        assert!(sql.contains("    properties.sasl.password='s''cret',\n"));
        assert!(sql.contains("    properties.fetch.max.bytes='1048576'\n) FORMAT PLAIN ENCODE BYTES;"));
    }

    #[test]
    fn test_json_without_columns_needs_payload() {
        let src = source("type: kafka\ntopic: raw\nbootstrap_servers: b:9092\n");
        let err = build_kafka_statement(&src, &[]).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let sql = build_kafka_statement(&src, &[inc(MetadataColumn::Payload)]).unwrap().sql;
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS raw\nINCLUDE payload AS kafka_payload\nWITH ("));
    }

    #[test]
    fn test_csv_format_params() {
        let src = source(
            "type: kafka\ntopic: csv_in\nbootstrap_servers: b:9092\nencode: CSV\ncsv_without_header: true\ncsv_delimiter: \";\"\ncolumns:\n  - { name: a, type: INT }\n",
        );
        let sql = build_kafka_statement(&src, &[]).unwrap().sql;
        assert!(sql.ends_with(
            "FORMAT PLAIN ENCODE CSV (\n    without_header = 'true',\n    delimiter = ';'\n);"
        ));
    }

    #[test]
    fn test_cdc_include_rejected_for_kafka() {
        let src = source("type: kafka\ntopic: t\nbootstrap_servers: b:9092\nencode: BYTES\n");
        assert!(build_kafka_statement(&src, &[inc(MetadataColumn::TableName)]).is_err());
    }
}
