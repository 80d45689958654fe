//! Per-family sink rules.
//!
//! Every rule runs; a sink is rejected with all of its issues at once.
//! Only a [`ValidatedSink`] can be turned into a CREATE SINK statement.

use crate::config::{
    CatalogType, ElasticsearchSinkConfig, IcebergSinkConfig, PostgresSinkConfig, S3SinkConfig,
    SinkConfig, SinkMode,
};
use crate::core::identifier::validate_identifier;
use crate::ddl::naming::sink_name;

use super::{CheckResult, ValidationReport};

/// A sink config that passed [`validate_sink`], with its resolved name.
#[derive(Debug, Clone)]
pub struct ValidatedSink {
    config: SinkConfig,
    name: String,
}

impl ValidatedSink {
    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    /// Explicit or generated sink name, without schema.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Storage backend of an Iceberg warehouse, inferred from its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseBackend {
    S3,
    Gcs,
    Azure,
    S3Tables,
    Unknown,
}

impl WarehouseBackend {
    pub fn infer(warehouse_path: &str) -> Self {
        if warehouse_path.starts_with("s3://") || warehouse_path.starts_with("s3a://") {
            WarehouseBackend::S3
        } else if warehouse_path.starts_with("gs://") {
            WarehouseBackend::Gcs
        } else if warehouse_path.starts_with("azblob://") || warehouse_path.starts_with("abfss://") {
            WarehouseBackend::Azure
        } else if warehouse_path.starts_with("arn:aws:s3tables:") {
            WarehouseBackend::S3Tables
        } else {
            WarehouseBackend::Unknown
        }
    }
}

/// Check a sink config and resolve its name.
pub fn validate_sink(config: &SinkConfig) -> CheckResult<ValidatedSink> {
    let mut report = ValidationReport::default();

    if let Some(name) = config.name() {
        if let Err(e) = validate_identifier(name) {
            report.fail("sink.name", e.to_string());
        }
    }
    if let Some(schema) = config.schema() {
        if let Err(e) = validate_identifier(schema) {
            report.fail("sink.schema", e.to_string());
        }
    }

    match config {
        SinkConfig::Iceberg(c) => check_iceberg(&mut report, c),
        SinkConfig::Postgres(c) => check_postgres(&mut report, c),
        SinkConfig::Elasticsearch(c) => check_elasticsearch(&mut report, c),
        SinkConfig::S3(c) => check_s3(&mut report, c),
    }

    report.finish(|| ValidatedSink {
        config: config.clone(),
        name: sink_name(config),
    })
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn require(report: &mut ValidationReport, field: &str, value: &str) {
    if value.trim().is_empty() {
        report.fail(format!("sink.{}", field), format!("{} is required", field));
    }
}

fn require_positive(report: &mut ValidationReport, field: &str, value: Option<i64>) {
    if let Some(v) = value {
        if v <= 0 {
            report.fail(
                format!("sink.{}", field),
                format!("{} must be a positive integer, got {}", field, v),
            );
        }
    }
}

fn check_iceberg(report: &mut ValidationReport, c: &IcebergSinkConfig) {
    require(report, "warehouse_path", &c.warehouse_path);
    require(report, "database_name", &c.database_name);
    require(report, "table_name", &c.table_name);

    match WarehouseBackend::infer(&c.warehouse_path) {
        WarehouseBackend::S3 => {
            if is_blank(c.s3_region.as_deref()) && is_blank(c.s3_endpoint.as_deref()) {
                report.fail("sink.s3_region", "S3 warehouse requires s3_region or s3_endpoint");
            }
            let has_keys = c.s3_access_key.is_some() && c.s3_secret_key.is_some();
            if !has_keys && c.enable_config_load != Some(true) {
                report.caution(
                    "sink.s3_access_key",
                    "no S3 access keys and enable_config_load is off; credentials must come from the environment",
                );
            }
        }
        WarehouseBackend::Gcs => {
            if c.gcs_credential.is_none() && c.enable_config_load != Some(true) {
                report.caution("sink.gcs_credential", "no gcs_credential for gs:// warehouse");
            }
        }
        WarehouseBackend::Azure => {
            if is_blank(c.azblob_account_name.as_deref()) {
                report.fail("sink.azblob_account_name", "Azure warehouse requires azblob_account_name");
            }
            if c.azblob_account_key.is_none() {
                report.fail("sink.azblob_account_key", "Azure warehouse requires azblob_account_key");
            }
        }
        WarehouseBackend::S3Tables => {
            if c.catalog_type != Some(CatalogType::Rest) {
                report.fail("sink.catalog_type", "S3 Tables warehouse requires catalog_type rest");
            }
            if is_blank(c.rest_signing_region.as_deref()) {
                report.fail("sink.rest_signing_region", "S3 Tables warehouse requires rest_signing_region");
            }
            if is_blank(c.rest_signing_name.as_deref()) {
                report.fail("sink.rest_signing_name", "S3 Tables warehouse requires rest_signing_name");
            }
            if c.rest_sigv4_enabled != Some(true) {
                report.fail("sink.rest_sigv4_enabled", "S3 Tables warehouse requires rest_sigv4_enabled: true");
            }
        }
        WarehouseBackend::Unknown => {
            if !c.warehouse_path.is_empty() {
                report.fail(
                    "sink.warehouse_path",
                    format!(
                        "unsupported warehouse '{}'; expected s3://, s3a://, gs://, azblob://, abfss:// or arn:aws:s3tables:",
                        c.warehouse_path
                    ),
                );
            }
        }
    }

    match c.catalog_type {
        Some(CatalogType::Glue) if is_blank(c.catalog_name.as_deref()) => {
            report.fail("sink.catalog_name", "glue catalog requires catalog_name");
        }
        Some(kind @ (CatalogType::Rest | CatalogType::Jdbc)) if is_blank(c.catalog_uri.as_deref()) => {
            report.fail("sink.catalog_uri", format!("{} catalog requires catalog_uri", kind.as_str()));
        }
        _ => {}
    }
    if c.catalog_type == Some(CatalogType::Jdbc)
        && (is_blank(c.catalog_jdbc_user.as_deref()) || c.catalog_jdbc_password.is_none())
    {
        report.fail(
            "sink.catalog_jdbc_user",
            "jdbc catalog requires catalog_jdbc_user and catalog_jdbc_password",
        );
    }

    if c.mode == SinkMode::Upsert && is_blank(c.primary_key.as_deref()) {
        report.fail("sink.primary_key", "primary_key is required for upsert mode");
    }
    if c.mode == SinkMode::Upsert && c.force_append_only == Some(true) {
        report.fail("sink.force_append_only", "force_append_only cannot be used with upsert mode");
    }

    require_positive(report, "commit_checkpoint_interval", c.commit_checkpoint_interval);
    require_positive(report, "compaction_interval_sec", c.compaction_interval_sec);
    if let Some(n) = c.commit_retry_num {
        if n < 0 {
            report.fail("sink.commit_retry_num", "commit_retry_num cannot be negative");
        }
    }
}

fn check_postgres(report: &mut ValidationReport, c: &PostgresSinkConfig) {
    require(report, "hostname", &c.hostname);
    require(report, "username", &c.username);
    require(report, "database", &c.database);
    if c.port == 0 {
        report.fail("sink.port", "port must be between 1 and 65535");
    }
    if c.mode == SinkMode::Upsert && is_blank(c.primary_key.as_deref()) {
        report.fail("sink.primary_key", "primary_key is required for upsert mode");
    }
    if c.password.is_empty() {
        report.caution("sink.password", "no password configured");
    }
}

fn check_elasticsearch(report: &mut ValidationReport, c: &ElasticsearchSinkConfig) {
    if !(c.url.starts_with("http://") || c.url.starts_with("https://")) {
        report.fail("sink.url", "url must start with http:// or https://");
    }

    match (is_blank(c.index.as_deref()), is_blank(c.index_column.as_deref())) {
        (false, false) => report.fail("sink.index", "mutually exclusive: index and index_column both set."),
        (true, true) => report.fail("sink.index", "one of index or index_column is required."),
        _ => {}
    }

    if is_blank(c.username.as_deref()) != c.password.is_none() {
        report.fail(
            "sink.username",
            "username and password must be set together",
        );
    }

    require_positive(report, "retry_on_conflict", c.retry_on_conflict);
    require_positive(report, "batch_size_kb", c.batch_size_kb);
    require_positive(report, "batch_num_messages", c.batch_num_messages);
    require_positive(report, "concurrent_requests", c.concurrent_requests);
}

fn check_s3(report: &mut ValidationReport, c: &S3SinkConfig) {
    require(report, "region", &c.region);
    require(report, "bucket", &c.bucket);
    require(report, "path", &c.path);
    if c.mode != SinkMode::AppendOnly {
        report.fail("sink.mode", "S3 sinks only support append-only mode");
    }
    if c.access_key.is_some() != c.secret_key.is_some() {
        report.fail("sink.access_key", "access_key and secret_key must be set together");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    fn es(index: Option<&str>, index_column: Option<&str>) -> ElasticsearchSinkConfig {
        ElasticsearchSinkConfig {
            url: "http://es:9200".into(),
            index: index.map(String::from),
            index_column: index_column.map(String::from),
            ..Default::default()
        }
    }

    fn iceberg(warehouse: &str) -> IcebergSinkConfig {
        IcebergSinkConfig {
            warehouse_path: warehouse.into(),
            database_name: "analytics".into(),
            table_name: "orders".into(),
            ..Default::default()
        }
    }

    // =========================================================================
    // Elasticsearch
    // =========================================================================

    #[test]
    fn test_es_index_and_column_both_set() {
        let report = validate_sink(&SinkConfig::Elasticsearch(es(Some("orders"), Some("idx")))).unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "mutually exclusive: index and index_column both set.");
    }

    #[test]
    fn test_es_index_or_column_required() {
        let report = validate_sink(&SinkConfig::Elasticsearch(es(None, None))).unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].message, "one of index or index_column is required.");
    }

    #[test]
    fn test_es_auth_all_or_nothing() {
        let mut config = es(Some("orders"), None);
        config.username = Some("elastic".into());
        assert!(validate_sink(&SinkConfig::Elasticsearch(config.clone())).is_err());

        config.password = Some(Secret::new("pw"));
        let checked = validate_sink(&SinkConfig::Elasticsearch(config)).unwrap();
        assert_eq!(checked.value.name(), "elasticsearch_orders_sink");
    }

    #[test]
    fn test_es_batching_positive() {
        let mut config = es(Some("orders"), None);
        config.batch_size_kb = Some(0);
        config.concurrent_requests = Some(-1);
        config.retry_on_conflict = Some(3);
        let report = validate_sink(&SinkConfig::Elasticsearch(config)).unwrap_err();
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sink.batch_size_kb", "sink.concurrent_requests"]);
    }

    // =========================================================================
    // Iceberg
    // =========================================================================

    #[test]
    fn test_iceberg_backend_inference() {
        assert_eq!(WarehouseBackend::infer("s3a://lake"), WarehouseBackend::S3);
        assert_eq!(WarehouseBackend::infer("gs://lake"), WarehouseBackend::Gcs);
        assert_eq!(WarehouseBackend::infer("abfss://c@acct.dfs.core.windows.net"), WarehouseBackend::Azure);
        assert_eq!(
            WarehouseBackend::infer("arn:aws:s3tables:us-east-1:123:bucket/b"),
            WarehouseBackend::S3Tables
        );
        assert_eq!(WarehouseBackend::infer("hdfs://x"), WarehouseBackend::Unknown);
    }

    #[test]
    fn test_iceberg_s3_needs_region_or_endpoint() {
        let report = validate_sink(&SinkConfig::Iceberg(iceberg("s3://lake/wh"))).unwrap_err();
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "sink.s3_region");
        assert_eq!(report.warnings.len(), 1);

        let mut config = iceberg("s3://lake/wh");
        config.s3_endpoint = Some("http://minio:9000".into());
        config.enable_config_load = Some(true);
        let checked = validate_sink(&SinkConfig::Iceberg(config)).unwrap();
        assert!(checked.warnings.is_empty());
    }

    #[test]
    fn test_iceberg_azure_needs_account() {
        let report = validate_sink(&SinkConfig::Iceberg(iceberg("azblob://container/wh"))).unwrap_err();
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_iceberg_s3_tables_needs_rest_signing() {
        let mut config = iceberg("arn:aws:s3tables:us-east-1:123456789012:bucket/lake");
        let report = validate_sink(&SinkConfig::Iceberg(config.clone())).unwrap_err();
        assert_eq!(report.errors.len(), 4);

        config.catalog_type = Some(CatalogType::Rest);
        config.catalog_uri = Some("https://s3tables.us-east-1.amazonaws.com/iceberg".into());
        config.rest_signing_region = Some("us-east-1".into());
        config.rest_signing_name = Some("s3tables".into());
        config.rest_sigv4_enabled = Some(true);
        assert!(validate_sink(&SinkConfig::Iceberg(config)).is_ok());
    }

    #[test]
    fn test_iceberg_catalog_rules() {
        let mut config = iceberg("gs://lake");
        config.gcs_credential = Some(Secret::new("b64"));
        config.catalog_type = Some(CatalogType::Jdbc);
        let report = validate_sink(&SinkConfig::Iceberg(config)).unwrap_err();
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sink.catalog_uri", "sink.catalog_jdbc_user"]);
    }

    #[test]
    fn test_iceberg_upsert_needs_primary_key() {
        let mut config = iceberg("gs://lake");
        config.mode = SinkMode::Upsert;
        config.commit_checkpoint_interval = Some(0);
        let report = validate_sink(&SinkConfig::Iceberg(config)).unwrap_err();
        let fields: Vec<&str> = report.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sink.primary_key", "sink.commit_checkpoint_interval"]);
    }

    // =========================================================================
    // Postgres and S3
    // =========================================================================

    #[test]
    fn test_postgres_upsert_needs_primary_key() {
        let mut config = PostgresSinkConfig {
            hostname: "warehouse".into(),
            port: 5432,
            username: "loader".into(),
            password: Secret::new("pw"),
            database: "dw".into(),
            mode: SinkMode::Upsert,
            ..Default::default()
        };
        assert!(validate_sink(&SinkConfig::Postgres(config.clone())).is_err());

        config.primary_key = Some("id".into());
        assert!(validate_sink(&SinkConfig::Postgres(config.clone())).is_ok());

        config.mode = SinkMode::AppendOnly;
        config.primary_key = None;
        assert!(validate_sink(&SinkConfig::Postgres(config)).is_ok());
    }

    #[test]
    fn test_s3_append_only() {
        let config = S3SinkConfig {
            region: "us-east-1".into(),
            bucket: "b".into(),
            path: "out/".into(),
            mode: SinkMode::Upsert,
            ..Default::default()
        };
        let report = validate_sink(&SinkConfig::S3(config)).unwrap_err();
        assert_eq!(report.errors[0].field, "sink.mode");
    }
}
