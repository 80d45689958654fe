//! `CREATE SOURCE` statements for CDC connectors.

use tracing::debug;

use crate::config::{
    MongoDbSourceConfig, MysqlSourceConfig, MysqlSslMode, PostgresSourceConfig, SourceConfig,
    SqlServerSourceConfig, MYSQL_DEFAULT_CHARSET, MYSQL_DEFAULT_CONNECT_TIMEOUT,
    MYSQL_DEFAULT_HEARTBEAT_INTERVAL, MYSQL_DEFAULT_TIME_ZONE,
};
use crate::core::identifier::quote_ident;
use crate::error::Result;
use crate::validate::ValidatedSource;

use super::kafka::build_kafka_statement;
use super::with_options::WithOptions;
use super::Statement;

/// Build the statement that creates the shared source object.
///
/// Kafka sources are standalone objects and are built without metadata
/// includes here; use [`build_kafka_statement`] to attach them.
pub fn build_source_statement(source: &ValidatedSource) -> Result<Statement> {
    let with = match source.config() {
        SourceConfig::Postgres(c) => postgres_options(c),
        SourceConfig::Mysql(c) => mysql_options(c),
        SourceConfig::SqlServer(c) => sqlserver_options(c),
        SourceConfig::MongoDb(c) => mongodb_options(c, &c.collection_name),
        SourceConfig::Kafka(_) => return build_kafka_statement(source, &[]),
    };

    debug!(source = source.name(), properties = with.len(), "built source properties");
    let sql = format!(
        "CREATE SOURCE IF NOT EXISTS {} {};",
        quote_ident(source.name())?,
        with.render_block()
    );
    Ok(Statement::new(source.name(), sql))
}

fn postgres_options(c: &PostgresSourceConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "postgres-cdc")
        .push("hostname", &c.hostname)
        .push("port", c.port)
        .push("username", &c.username)
        .push("password", c.password.expose())
        .push("database.name", &c.database)
        .push("schema.name", &c.schema)
        .push_opt("ssl.mode", c.ssl_mode.map(|m| m.as_str()))
        .push_opt("ssl.root.cert", c.ssl_root_cert.as_deref())
        .push_opt("slot.name", c.slot_name.as_deref())
        .push_opt("publication.name", c.publication_name.as_deref())
        .push_opt("publication.create.enable", c.publication_create_enable)
        .push_flag("auto.schema.change", c.auto_schema_change)
        .extend_prefixed("debezium.", &c.debezium)
        .extend_prefixed("", &c.properties);
    with
}

fn mysql_options(c: &MysqlSourceConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "mysql-cdc")
        .push("hostname", &c.hostname)
        .push("port", c.port)
        .push("username", &c.username)
        .push("password", c.password.expose())
        .push("database.name", &c.database)
        .push_opt("server.id", c.server_id)
        .push_flag("auto.schema.change", c.auto_schema_change)
        .push_opt("transactional", c.transactional);

    if c.ssl_mode != MysqlSslMode::Disabled {
        with.push("ssl.mode", c.ssl_mode.as_str());
    }
    with.push_opt("ssl.ca", c.ssl_ca.as_deref())
        .push_opt("ssl.cert", c.ssl_cert.as_deref())
        .push_opt("ssl.key", c.ssl_key.as_deref())
        .push_non_default("connect.timeout", c.connect_timeout, MYSQL_DEFAULT_CONNECT_TIMEOUT)
        .push_non_default("heartbeat.interval", c.heartbeat_interval, MYSQL_DEFAULT_HEARTBEAT_INTERVAL)
        .push_non_default("charset", c.charset.as_str(), MYSQL_DEFAULT_CHARSET)
        .push_non_default("server.time.zone", c.server_time_zone.as_str(), MYSQL_DEFAULT_TIME_ZONE)
        .extend_prefixed("debezium.", &c.debezium);
    with
}

fn sqlserver_options(c: &SqlServerSourceConfig) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "sqlserver-cdc")
        .push("hostname", &c.hostname)
        .push("port", c.port)
        .push("username", &c.username)
        .push("password", c.password.expose())
        .push("database.name", &c.database)
        .push_flag("database.encrypt", c.encrypt)
        .extend_prefixed("debezium.", &c.debezium);
    with
}

/// MongoDB connector properties for `collection` (a pattern list or one `db.coll`).
pub(crate) fn mongodb_options(c: &MongoDbSourceConfig, collection: &str) -> WithOptions {
    let mut with = WithOptions::new();
    with.push("connector", "mongodb-cdc")
        .push("mongodb.url", c.mongodb_url.expose())
        .push("collection.name", collection);
    with
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_source;

    fn build(yaml: &str) -> String {
        let config: SourceConfig = serde_yaml::from_str(yaml).unwrap();
        let source = validate_source(&config).unwrap().into_inner();
        build_source_statement(&source).unwrap().sql
    }

    #[test]
    fn test_postgres_source_shape() {
        let sql = build(
            "type: postgres\nhostname: db\nusername: rw\npassword: \"p'w\"\ndatabase: shop\nslot_name: rw_slot\n",
        );
        assert_eq!(
            sql,
            "CREATE SOURCE IF NOT EXISTS postgres_cdc_shop WITH (\n    connector='postgres-cdc',\n    hostname='db',\n    port='5432',\n    username='rw',\n    password='p''w',\n    database.name='shop',\n    schema.name='public',\n    slot.name='rw_slot'\n);"
        );
    }

    #[test]
    fn test_postgres_optional_properties() {
        let sql = build(
            r#"
type: postgres
hostname: db
username: rw
password: pw
database: shop
ssl_mode: verify-full
publication_create_enable: false
auto_schema_change: true
debezium:
  schema.history.internal.skip.unparseable.ddl: "true"
"#,
        );
        assert!(sql.contains("    ssl.mode='verify-full',\n"));
        assert!(sql.contains("    publication.create.enable='false',\n"));
        assert!(sql.contains("    auto.schema.change='true',\n"));
        assert!(sql.contains("    debezium.schema.history.internal.skip.unparseable.ddl='true'\n"));
        assert!(!sql.contains("slot.name"));
    }

    #[test]
    fn test_mysql_defaults_omitted() {
        let sql = build("type: mysql\nhostname: h\nusername: u\npassword: pw\ndatabase: app\nserver_id: 5401\n");
        assert!(sql.starts_with("CREATE SOURCE IF NOT EXISTS mysql_cdc_app WITH (\n    connector='mysql-cdc',"));
        assert!(sql.contains("server.id='5401'"));
        for key in ["ssl.mode", "connect.timeout", "heartbeat.interval", "charset", "server.time.zone"] {
            assert!(!sql.contains(key), "unexpected {}", key);
        }
    }

    #[test]
    fn test_mysql_non_defaults_emitted() {
        let sql = build(
            "type: mysql\nhostname: h\nusername: u\npassword: pw\ndatabase: app\nserver_id: 1\nssl_mode: required\nconnect_timeout: 60\ncharset: utf8mb4\n",
        );
        assert!(sql.contains("ssl.mode='required'"));
        assert!(sql.contains("connect.timeout='60'"));
        assert!(sql.contains("charset='utf8mb4'"));
        assert!(!sql.contains("heartbeat.interval"));
    }

    #[test]
    fn test_sqlserver_encrypt_flag() {
        let sql = build("type: sqlserver\nhostname: h\nusername: sa\npassword: pw\ndatabase: erp\nencrypt: true\n");
        assert!(sql.contains("connector='sqlserver-cdc'"));
        assert!(sql.ends_with("    database.encrypt='true'\n);"));
    }

    #[test]
    fn test_mongodb_source() {
        let sql = build("type: mongodb\nmongodb_url: mongodb://m:27017/?replicaSet=rs0\ncollection_name: shop.*\n");
        assert_eq!(
            sql,
            "CREATE SOURCE IF NOT EXISTS mongodb_cdc_shop WITH (\n    connector='mongodb-cdc',\n    mongodb.url='mongodb://m:27017/?replicaSet=rs0',\n    collection.name='shop.*'\n);"
        );
    }
}
