//! `CREATE SINK` statements.

use crate::config::{
    ElasticsearchSinkConfig, IcebergSinkConfig, PostgresSinkConfig, S3SinkConfig, SinkConfig,
    ICEBERG_DEFAULT_COMMIT_CHECKPOINT_INTERVAL, ICEBERG_DEFAULT_COMMIT_RETRY_NUM,
};
use crate::core::identifier::{qualify, quote_object_name, quote_qualified};
use crate::error::Result;
use crate::validate::ValidatedSink;

use super::format::FormatClause;
use super::with_options::WithOptions;
use super::Statement;

/// Setup statement required before creating an Elasticsearch sink.
pub const ES_SINK_DECOUPLE_SETUP: &str = "SET sink_decouple = false;";

/// What a sink reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    /// `FROM <table>`
    Table(String),
    /// `AS <query>`
    Query(String),
}

/// Build the CREATE SINK statement for a validated sink.
pub fn build_sink_statement(sink: &ValidatedSink, target: &SinkTarget) -> Result<Statement> {
    let config = sink.config();
    let name = qualify(config.schema(), sink.name());

    let with = match config {
        SinkConfig::Iceberg(c) => iceberg_options(c),
        SinkConfig::Postgres(c) => postgres_options(c, sink.name()),
        SinkConfig::Elasticsearch(c) => elasticsearch_options(c),
        SinkConfig::S3(c) => s3_options(c),
    };

    let input = match target {
        SinkTarget::Table(table) => format!("FROM {}", quote_object_name(table)?),
        SinkTarget::Query(query) => format!("AS {}", query.trim().trim_end_matches(';')),
    };

    let mut sql = format!(
        "CREATE SINK IF NOT EXISTS {}\n{}\n{}",
        quote_qualified(config.schema(), sink.name())?,
        input,
        with.render_block()
    );
    if let SinkConfig::S3(c) = config {
        let mut format = FormatClause::new(c.format.as_str(), c.encode.as_str());
        if c.force_append_only {
            format = format.param("force_append_only", Some("true"));
        }
        sql.push('\n');
        sql.push_str(&format.render());
    }
    sql.push(';');

    let statement = Statement::new(name, sql);
    Ok(match config {
        SinkConfig::Elasticsearch(_) => statement.with_setup(ES_SINK_DECOUPLE_SETUP),
        _ => statement,
    })
}

fn iceberg_options(c: &IcebergSinkConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "iceberg")
        .push("type", c.mode.as_str())
        .push("warehouse.path", &c.warehouse_path)
        .push("database.name", &c.database_name)
        .push("table.name", &c.table_name)
        .push_opt("catalog.type", c.catalog_type.map(|t| t.as_str()))
        .push_opt("catalog.name", c.catalog_name.as_deref())
        .push_opt("catalog.uri", c.catalog_uri.as_deref())
        .push_secret("catalog.credential", c.catalog_credential.as_ref())
        .push_opt("catalog.jdbc.user", c.catalog_jdbc_user.as_deref())
        .push_secret("catalog.jdbc.password", c.catalog_jdbc_password.as_ref())
        .push_opt("catalog.rest.signing_region", c.rest_signing_region.as_deref())
        .push_opt("catalog.rest.signing_name", c.rest_signing_name.as_deref())
        .push_opt("catalog.rest.sigv4_enabled", c.rest_sigv4_enabled)
        .push_opt("primary_key", c.primary_key.as_deref())
        .push_opt("force_append_only", c.force_append_only)
        .push_opt("s3.region", c.s3_region.as_deref())
        .push_opt("s3.endpoint", c.s3_endpoint.as_deref())
        .push_secret("s3.access.key", c.s3_access_key.as_ref())
        .push_secret("s3.secret.key", c.s3_secret_key.as_ref())
        .push_opt("s3.path.style.access", c.s3_path_style_access)
        .push_opt("enable_config_load", c.enable_config_load)
        .push_secret("gcs.credential", c.gcs_credential.as_ref())
        .push_opt("azblob.account_name", c.azblob_account_name.as_deref())
        .push_secret("azblob.account_key", c.azblob_account_key.as_ref())
        .push_opt("azblob.endpoint_url", c.azblob_endpoint_url.as_deref())
        .push_opt("is_exactly_once", c.is_exactly_once);
    if let Some(interval) = c.commit_checkpoint_interval {
        with.push_non_default("commit_checkpoint_interval", interval, ICEBERG_DEFAULT_COMMIT_CHECKPOINT_INTERVAL);
    }
    if let Some(retries) = c.commit_retry_num {
        with.push_non_default("commit_retry_num", retries, ICEBERG_DEFAULT_COMMIT_RETRY_NUM);
    }
    with.push_opt("create_table_if_not_exists", c.create_table_if_not_exists)
        .push_opt("enable_compaction", c.enable_compaction)
        .push_opt("compaction_interval_sec", c.compaction_interval_sec)
        .push_opt("enable_snapshot_expiration", c.enable_snapshot_expiration)
        .extend_prefixed("", &c.properties);
    with
}

fn postgres_options(c: &PostgresSinkConfig, sink_name: &str) -> WithOptions {
    let schema = if c.target_schema.is_empty() { "public" } else { c.target_schema.as_str() };
    let table = c.table.as_deref().unwrap_or(sink_name);

    let mut with = WithOptions::new();
    with.push("connector", "postgres")
        .push("postgres.host", &c.hostname)
        .push("postgres.port", c.port)
        .push("postgres.user", &c.username)
        .push("postgres.password", c.password.expose())
        .push("postgres.database", &c.database)
        .push("postgres.table", format!("{}.{}", schema, table))
        .push("type", c.mode.as_str())
        .push_opt("primary_key", c.primary_key.as_deref())
        .push_opt("postgres.ssl.mode", c.ssl_mode.as_deref())
        .extend_prefixed("", &c.properties);
    with
}

fn elasticsearch_options(c: &ElasticsearchSinkConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "elasticsearch")
        .push("url", &c.url)
        .push_opt("index", c.index.as_deref().filter(|s| !s.trim().is_empty()))
        .push_opt(
            "index_column",
            c.index_column.as_deref().filter(|s| !s.trim().is_empty()),
        )
        .push_opt("username", c.username.as_deref())
        .push_secret("password", c.password.as_ref())
        .push_opt("primary_key", c.primary_key.as_deref());
    if let Some(delimiter) = c.delimiter.as_deref() {
        with.push_non_default("delimiter", delimiter, ",");
    }
    with.push_opt("routing_column", c.routing_column.as_deref())
        .push_opt("retry_on_conflict", c.retry_on_conflict)
        .push_opt("batch_size_kb", c.batch_size_kb)
        .push_opt("batch_num_messages", c.batch_num_messages)
        .push_opt("concurrent_requests", c.concurrent_requests)
        .extend_prefixed("", &c.properties);
    with
}

fn s3_options(c: &S3SinkConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "s3")
        .push("s3.region_name", &c.region)
        .push("s3.bucket_name", &c.bucket)
        .push("s3.path", &c.path)
        .push("type", c.mode.as_str())
        .push_secret("s3.credentials.access", c.access_key.as_ref())
        .push_secret("s3.credentials.secret", c.secret_key.as_ref())
        .push_opt("s3.endpoint_url", c.endpoint_url.as_deref())
        .push_opt("s3.assume_role", c.assume_role.as_deref());
    with
}
