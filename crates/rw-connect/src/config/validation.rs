//! Structural configuration validation.

use super::{PipelineConfig, SinkSpec};
use crate::core::identifier::validate_identifier;
use crate::error::{ConnectError, Result};

/// Validate the configuration.
pub fn validate(config: &PipelineConfig) -> Result<()> {
    // Source naming
    if let Some(name) = config.source.name() {
        validate_identifier(name)
            .map_err(|e| ConnectError::Config(format!("source.name: {}", e)))?;
    }

    // Column configuration
    for (table, column_config) in &config.columns {
        if let Some(target) = &column_config.custom_target_name {
            validate_identifier(target).map_err(|e| {
                ConnectError::Config(format!("columns.{}.target_name: {}", table, e))
            })?;
        }
        if let Some(selected) = &column_config.selected_columns {
            for column in selected {
                if column.name.is_empty() {
                    return Err(ConnectError::Config(format!(
                        "columns.{}: column name is required",
                        table
                    )));
                }
            }
        }
    }

    // Table options - only check if explicitly set
    let options = &config.table_options;
    if let Some(0) = options.snapshot_interval {
        return Err(ConnectError::Config(
            "table_options.snapshot_interval must be at least 1".into(),
        ));
    }
    if let Some(0) = options.snapshot_batch_size {
        return Err(ConnectError::Config(
            "table_options.snapshot_batch_size must be at least 1".into(),
        ));
    }
    if let Some(0) = options.backfill_parallelism {
        return Err(ConnectError::Config(
            "table_options.backfill_parallelism must be at least 1".into(),
        ));
    }
    if let Some(0) = options.backfill_num_rows_per_split {
        return Err(ConnectError::Config(
            "table_options.backfill_num_rows_per_split must be at least 1".into(),
        ));
    }
    if let Some(schema) = &options.target_schema {
        validate_identifier(schema)
            .map_err(|e| ConnectError::Config(format!("table_options.target_schema: {}", e)))?;
    }

    if let Some(0) = config.discovery.concurrency {
        return Err(ConnectError::Config(
            "discovery.concurrency must be at least 1".into(),
        ));
    }

    for (i, spec) in config.sinks.iter().enumerate() {
        validate_sink_spec(i, spec)?;
    }

    Ok(())
}

fn validate_sink_spec(index: usize, spec: &SinkSpec) -> Result<()> {
    let field = format!("sinks[{}]", index);

    match (spec.from.is_empty(), &spec.query) {
        (true, None) => {
            return Err(ConnectError::Config(format!(
                "{}: either from or query is required",
                field
            )))
        }
        (false, Some(_)) => {
            return Err(ConnectError::Config(format!(
                "{}: from and query cannot both be set",
                field
            )))
        }
        _ => {}
    }

    if let Some(name) = spec.sink.name() {
        validate_identifier(name)
            .map_err(|e| ConnectError::Config(format!("{}.sink.name: {}", field, e)))?;
    }

    for table in spec.queries.keys() {
        if !spec.from.contains(table) {
            return Err(ConnectError::Config(format!(
                "{}.queries: '{}' is not listed in from",
                field, table
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
source:
  type: postgres
  hostname: localhost
  username: rw
  password: secret
  database: shop
tables:
  include: ["order*"]
columns:
  public.orders:
    selected_columns:
      - name: id
        primary_key: true
sinks:
  - sink:
      type: postgres
      hostname: warehouse
      username: loader
      database: dw
    from: [orders]
"#;

    fn valid_config() -> PipelineConfig {
        serde_yaml::from_str(VALID).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = valid_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_snapshot_interval() {
        let mut config = valid_config();
        config.table_options.snapshot_interval = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_concurrency() {
        let mut config = valid_config();
        config.discovery.concurrency = Some(0);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("discovery.concurrency"));
    }

    #[test]
    fn test_sink_needs_from_or_query() {
        let mut config = valid_config();
        config.sinks[0].from.clear();
        assert!(validate(&config).is_err());

        config.sinks[0].query = Some("SELECT 1".into());
        assert!(validate(&config).is_ok());

        config.sinks[0].from.push("orders".into());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_queries_must_name_from_tables() {
        let mut config = valid_config();
        config
            .sinks[0]
            .queries
            .insert("users".into(), "SELECT * FROM users".into());
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("'users' is not listed in from"));
    }

    #[test]
    fn test_empty_column_name() {
        let mut config = valid_config();
        if let Some(cfg) = config.columns.get_mut("public.orders") {
            cfg.selected_columns = Some(vec![crate::core::ColumnSelection::new("")]);
        }
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_from_yaml_validates() {
        assert!(PipelineConfig::from_yaml(VALID).is_ok());
        let broken = VALID.replace("from: [orders]", "from: []");
        assert!(PipelineConfig::from_yaml(&broken).is_err());
    }

    #[test]
    fn test_hash_is_stable() {
        let a = valid_config().hash();
        let b = valid_config().hash();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
