//! `CREATE TABLE ... FROM <source> TABLE '...'` for CDC tables, and the
//! standalone MongoDB collection tables.

use crate::config::{SourceConfig, TableOptions};
use crate::core::identifier::{quote_ident, quote_literal, quote_qualified};
use crate::core::schema::{TableColumnConfig, TableInfo};
use crate::error::{ConnectError, Result};
use crate::validate::{ColumnPlan, ValidatedSource};

use super::include::{render_includes, IncludeTarget};
use super::source::mongodb_options;
use super::with_options::{WithOptions, INDENT};
use super::{column_lines, ColumnDef, Statement};

const DEFAULT_SNAPSHOT_INTERVAL: u32 = 1;
const DEFAULT_SNAPSHOT_BATCH_SIZE: u32 = 1000;

/// RisingWave name of the table created for `table`: the configured
/// `target_name` or the upstream name, in `target_schema` when one is set.
pub fn target_table_name(
    table: &TableInfo,
    column_config: Option<&TableColumnConfig>,
    options: &TableOptions,
) -> String {
    let name = column_config
        .and_then(|c| c.custom_target_name.as_deref())
        .unwrap_or(table.table_name());
    match options.target_schema.as_deref() {
        Some(schema) if !schema.is_empty() && schema != "public" => format!("{}.{}", schema, name),
        _ => name.to_string(),
    }
}

/// Build the CREATE TABLE statement for one selected upstream table.
///
/// `plan` of `None` emits `(*)` so the engine takes the upstream schema.
/// MongoDB collections always use the fixed `_id`/`payload` layout.
pub fn build_table_statement(
    source: &ValidatedSource,
    table: &TableInfo,
    plan: Option<&ColumnPlan>,
    options: &TableOptions,
    target_name: &str,
) -> Result<Statement> {
    let target = quote_target(target_name, options)?;
    let include_target = match source.config() {
        SourceConfig::Postgres(_) => IncludeTarget::Postgres,
        SourceConfig::Mysql(_) => IncludeTarget::Mysql,
        SourceConfig::SqlServer(_) => IncludeTarget::SqlServer,
        SourceConfig::MongoDb(c) => {
            let includes = render_includes(&options.includes, IncludeTarget::MongoDb)?;
            let with = mongodb_options(c, &table.qualified_name());
            let mut sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (\n{}_id JSONB PRIMARY KEY,\n{}payload JSONB\n)",
                target, INDENT, INDENT
            );
            for line in includes {
                sql.push('\n');
                sql.push_str(&line);
            }
            sql.push('\n');
            sql.push_str(&with.render_block());
            sql.push(';');
            return Ok(Statement::new(target_name, sql));
        }
        SourceConfig::Kafka(_) => {
            return Err(ConnectError::Config(format!(
                "kafka source {} has no upstream tables",
                source.name()
            )))
        }
    };

    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} ", target);
    match plan {
        Some(plan) => {
            let defs = plan
                .columns()
                .iter()
                .map(|c| -> Result<ColumnDef<'_>> {
                    Ok(ColumnDef {
                        name: quote_ident(&c.name)?,
                        data_type: c.target_type.as_str(),
                        nullable: c.nullable,
                        primary_key: c.primary_key,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(&format!("(\n{}\n)", column_lines(defs).join(",\n")));
        }
        None => sql.push_str("(*)"),
    }

    let mut trailing = render_includes(&options.includes, include_target)?;
    let with = table_with_options(options);
    match with.len() {
        0 => {}
        1 => trailing.push(with.render_inline()),
        _ => trailing.push(with.render_block()),
    }

    let from = format!(
        "FROM {} TABLE {};",
        quote_ident(source.name())?,
        quote_literal(&upstream_name(table))
    );
    if trailing.is_empty() {
        sql.push(' ');
    } else {
        for line in trailing {
            sql.push('\n');
            sql.push_str(&line);
        }
        sql.push('\n');
    }
    sql.push_str(&from);

    Ok(Statement::new(target_name, sql))
}

/// Only a prefix added from `target_schema` is split off; any other dot
/// belongs to the table name.
fn quote_target(target_name: &str, options: &TableOptions) -> Result<String> {
    let schema = options
        .target_schema
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "public");
    let object = schema.and_then(|s| target_name.strip_prefix(s)?.strip_prefix('.'));
    match (schema, object) {
        (Some(schema), Some(object)) => quote_qualified(Some(schema), object),
        _ => quote_ident(target_name),
    }
}

fn upstream_name(table: &TableInfo) -> String {
    if table.schema_name().is_empty() {
        table.table_name().to_string()
    } else {
        table.qualified_name()
    }
}

fn table_with_options(options: &TableOptions) -> WithOptions {
    let mut with = WithOptions::new();
    if options.snapshot == Some(false) {
        with.push("snapshot", "false");
    }
    if let Some(interval) = options.snapshot_interval {
        with.push_non_default("snapshot.interval", interval, DEFAULT_SNAPSHOT_INTERVAL);
    }
    if let Some(batch) = options.snapshot_batch_size {
        with.push_non_default("snapshot.batch_size", batch, DEFAULT_SNAPSHOT_BATCH_SIZE);
    }
    with.push_opt("backfill.num_rows_per_split", options.backfill_num_rows_per_split)
        .push_opt("backfill.parallelism", options.backfill_parallelism)
        .push_opt("backfill.as_even_splits", options.backfill_as_even_splits);
    with
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{ColumnInfo, ColumnSelection};
    use crate::ddl::include::{MetadataColumn, MetadataInclude};
    use crate::dialect::PostgresToRisingWaveMapper;
    use crate::validate::{validate_columns, validate_source, ValidationMode};

    fn pg_source(name: &str) -> ValidatedSource {
        let yaml = format!(
            "type: postgres\nname: {}\nhostname: db\nusername: rw\npassword: pw\ndatabase: shop\n",
            name
        );
        let config: SourceConfig = serde_yaml::from_str(&yaml).unwrap();
        validate_source(&config).unwrap().into_inner()
    }

    fn user_plan() -> ColumnPlan {
        let table = TableInfo::new("public", "t");
        let discovered = vec![
            ColumnInfo::new("id", "int4", 1).primary_key(),
            ColumnInfo::new("email", "varchar(255)", 2),
        ];
        let selection = vec![
            ColumnSelection::new("id").primary_key(),
            ColumnSelection::new("email").with_type("VARCHAR(100)"),
        ];
        validate_columns(
            &table,
            &discovered,
            &selection,
            &PostgresToRisingWaveMapper::new(),
            ValidationMode::Live,
        )
        .unwrap()
        .into_inner()
    }

    #[test]
    fn test_filtered_table_exact_shape() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "t");
        let plan = user_plan();
        let stmt =
            build_table_statement(&source, &table, Some(&plan), &TableOptions::default(), "t").unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS t (\n    id INT PRIMARY KEY,\n    email VARCHAR(100)\n) FROM src TABLE 'public.t';"
        );
    }

    #[test]
    fn test_wildcard_table() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "orders");
        let stmt =
            build_table_statement(&source, &table, None, &TableOptions::default(), "orders").unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS orders (*) FROM src TABLE 'public.orders';"
        );
    }

    #[test]
    fn test_includes_and_inline_with() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "t");
        let options = TableOptions {
            snapshot: Some(false),
            includes: vec![MetadataInclude::from(MetadataColumn::Timestamp)],
            ..Default::default()
        };
        let stmt = build_table_statement(&source, &table, Some(&user_plan()), &options, "t").unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS t (\n    id INT PRIMARY KEY,\n    email VARCHAR(100)\n)\nINCLUDE timestamp AS commit_ts\nWITH ( snapshot='false' )\nFROM src TABLE 'public.t';"
        );
    }

    #[test]
    fn test_backfill_options_use_block() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "t");
        let options = TableOptions {
            snapshot_interval: Some(1),
            snapshot_batch_size: Some(5000),
            backfill_parallelism: Some(8),
            ..Default::default()
        };
        let stmt = build_table_statement(&source, &table, None, &options, "t").unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS t (*)\nWITH (\n    snapshot.batch_size='5000',\n    backfill.parallelism='8'\n)\nFROM src TABLE 'public.t';"
        );
    }

    #[test]
    fn test_composite_key_and_quoted_names() {
        let source = pg_source("src");
        let table = TableInfo::new("sales", "OrderLines");
        let discovered = vec![
            ColumnInfo::new("order_id", "int8", 1).primary_key(),
            ColumnInfo::new("Line No", "int4", 2).primary_key(),
        ];
        let plan = ColumnPlan::from_discovered(&discovered, &PostgresToRisingWaveMapper::new()).into_inner();
        let options = TableOptions {
            target_schema: Some("analytics".into()),
            ..Default::default()
        };
        let target = target_table_name(&table, None, &options);
        assert_eq!(target, "analytics.OrderLines");
        let stmt = build_table_statement(&source, &table, Some(&plan), &options, &target).unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS analytics.\"OrderLines\" (\n    order_id BIGINT NOT NULL,\n    \"Line No\" INT NOT NULL,\n    PRIMARY KEY (order_id, \"Line No\")\n) FROM src TABLE 'sales.OrderLines';"
        );
    }

    #[test]
    fn test_dotted_target_name_is_one_identifier() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "t");
        let plan = user_plan();

        let stmt =
            build_table_statement(&source, &table, Some(&plan), &TableOptions::default(), "dw.t")
                .unwrap();
        assert!(stmt.sql.starts_with("CREATE TABLE IF NOT EXISTS \"dw.t\" (\n"));

        let options = TableOptions {
            target_schema: Some("analytics".into()),
            ..Default::default()
        };
        let stmt =
            build_table_statement(&source, &table, Some(&plan), &options, "analytics.v1.t").unwrap();
        assert!(stmt.sql.starts_with("CREATE TABLE IF NOT EXISTS analytics.\"v1.t\" (\n"));
    }

    #[test]
    fn test_custom_target_name() {
        let table = TableInfo::new("public", "users");
        let config = TableColumnConfig {
            selected_columns: None,
            custom_target_name: Some("users_cdc".into()),
        };
        assert_eq!(
            target_table_name(&table, Some(&config), &TableOptions::default()),
            "users_cdc"
        );
    }

    #[test]
    fn test_unsupported_include_rejected() {
        let source = pg_source("src");
        let table = TableInfo::new("public", "t");
        let options = TableOptions {
            includes: vec![MetadataColumn::Offset.into()],
            ..Default::default()
        };
        let err = build_table_statement(&source, &table, None, &options, "t").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_mongodb_collection_table() {
        let config: SourceConfig = serde_yaml::from_str(
            "type: mongodb\nmongodb_url: mongodb://m:27017\ncollection_name: shop.*\n",
        )
        .unwrap();
        let source = validate_source(&config).unwrap().into_inner();
        let table = TableInfo::new("shop", "orders");
        let options = TableOptions {
            includes: vec![MetadataColumn::CollectionName.into()],
            ..Default::default()
        };
        let stmt = build_table_statement(&source, &table, None, &options, "orders").unwrap();
        assert_eq!(
            stmt.sql,
            "CREATE TABLE IF NOT EXISTS orders (\n    _id JSONB PRIMARY KEY,\n    payload JSONB\n)\nINCLUDE collection_name AS collection_name\nWITH (\n    connector='mongodb-cdc',\n    mongodb.url='mongodb://m:27017',\n    collection.name='shop.orders'\n);"
        );
    }
}
