//! Type mapping implementations, one per source dialect.
//!
//! Each mapper is a lookup table from a lowercase base type name to a
//! RisingWave type. Parameterized types keep their parameter text, arrays map
//! their element type, and unknown types fall back to `TEXT` with a warning.

use crate::core::traits::{TypeMapper, TypeMapping};

use super::native::NativeType;

/// Map every array dimension of `native` around the element mapping produced by `element`.
fn map_with_arrays(native: &NativeType, element: impl FnOnce(&NativeType) -> TypeMapping) -> TypeMapping {
    let mut mapping = element(native);
    if native.array_dims > 0 {
        mapping.target_type = native.wrap_array(mapping.target_type);
    }
    mapping
}

/// PostgreSQL → RisingWave type mapper.
#[derive(Debug, Clone, Default)]
pub struct PostgresToRisingWaveMapper;

impl PostgresToRisingWaveMapper {
    /// Create a new PostgreSQL to RisingWave mapper.
    pub fn new() -> Self {
        Self
    }
}

impl TypeMapper for PostgresToRisingWaveMapper {
    fn source_dialect(&self) -> &str {
        "postgres"
    }

    fn map_type(&self, native_type: &str, length_param: Option<u32>) -> TypeMapping {
        let mut native = NativeType::parse(native_type);
        // udt names spell arrays with a leading underscore (_int4)
        if native.array_dims == 0 && native.base.len() > 1 {
            if let Some(element) = native.base.strip_prefix('_') {
                native.base = element.to_string();
                native.array_dims = 1;
            }
        }
        map_with_arrays(&native, |t| postgres_to_risingwave(t, native_type, length_param))
    }
}

fn postgres_to_risingwave(t: &NativeType, raw: &str, length_param: Option<u32>) -> TypeMapping {
    match t.base.as_str() {
        // Integer types
        "smallint" | "int2" | "smallserial" | "serial2" => TypeMapping::lossless("SMALLINT"),
        "integer" | "int" | "int4" | "serial" | "serial4" => TypeMapping::lossless("INT"),
        "bigint" | "int8" | "bigserial" | "serial8" | "oid" => TypeMapping::lossless("BIGINT"),

        // Decimal/numeric
        "numeric" | "decimal" => TypeMapping::lossless(t.with_params("DECIMAL", None)),
        "money" => TypeMapping::lossless("DECIMAL"),

        // Floating point
        "real" | "float4" => TypeMapping::lossless("REAL"),
        "double precision" | "float8" | "float" => TypeMapping::lossless("DOUBLE PRECISION"),

        "boolean" | "bool" => TypeMapping::lossless("BOOLEAN"),

        // String types
        "character varying" | "varchar" | "character" | "char" | "bpchar" => {
            TypeMapping::lossless(t.with_params("VARCHAR", length_param))
        }
        "text" | "citext" => TypeMapping::lossless("TEXT"),
        "name" | "uuid" | "inet" | "cidr" | "macaddr" | "macaddr8" => {
            TypeMapping::lossless("VARCHAR")
        }
        "xml" => TypeMapping::lossless("TEXT"),

        "bytea" => TypeMapping::lossless("BYTEA"),

        // Date/time types
        "date" => TypeMapping::lossless("DATE"),
        "time" | "time without time zone" => TypeMapping::lossless("TIME"),
        "timetz" | "time with time zone" => TypeMapping::lossy(
            "TIME",
            format!("'{}' loses its time zone offset as TIME", raw),
        ),
        "timestamp" | "timestamp without time zone" => TypeMapping::lossless("TIMESTAMP"),
        "timestamptz" | "timestamp with time zone" => TypeMapping::lossless("TIMESTAMPTZ"),
        "interval" => TypeMapping::lossless("INTERVAL"),

        // JSON
        "json" | "jsonb" => TypeMapping::lossless("JSONB"),

        _ => TypeMapping::unknown("postgres", raw),
    }
}

/// MySQL → RisingWave type mapper.
///
/// Unsigned integers widen to the next signed type; `BIGINT UNSIGNED` becomes `DECIMAL`.
#[derive(Debug, Clone, Default)]
pub struct MysqlToRisingWaveMapper;

impl MysqlToRisingWaveMapper {
    /// Create a new MySQL to RisingWave mapper.
    pub fn new() -> Self {
        Self
    }
}

impl TypeMapper for MysqlToRisingWaveMapper {
    fn source_dialect(&self) -> &str {
        "mysql"
    }

    fn map_type(&self, native_type: &str, length_param: Option<u32>) -> TypeMapping {
        let native = NativeType::parse(native_type);
        map_with_arrays(&native, |t| mysql_to_risingwave(t, native_type, length_param))
    }
}

fn mysql_to_risingwave(t: &NativeType, raw: &str, length_param: Option<u32>) -> TypeMapping {
    let display_width_one = t.params.as_deref() == Some("1");

    match t.base.as_str() {
        // Boolean (MySQL uses TINYINT(1) for bool)
        "tinyint" if display_width_one && !t.unsigned => TypeMapping::lossless("BOOLEAN"),
        "bool" | "boolean" => TypeMapping::lossless("BOOLEAN"),

        // Integer types
        "tinyint" | "smallint" if !t.unsigned => TypeMapping::lossless("SMALLINT"),
        "tinyint" => TypeMapping::lossless("SMALLINT"),
        "smallint" | "mediumint" => TypeMapping::lossless("INT"),
        "int" | "integer" if t.unsigned => TypeMapping::lossless("BIGINT"),
        "int" | "integer" => TypeMapping::lossless("INT"),
        "bigint" if t.unsigned => TypeMapping::lossless("DECIMAL"),
        "bigint" => TypeMapping::lossless("BIGINT"),

        // Decimal/numeric
        "decimal" | "numeric" | "dec" | "fixed" => {
            TypeMapping::lossless(t.with_params("DECIMAL", None))
        }

        // Floating point
        "float" => TypeMapping::lossless("REAL"),
        "double" | "double precision" | "real" => TypeMapping::lossless("DOUBLE PRECISION"),

        // String types
        "char" | "varchar" => TypeMapping::lossless(t.with_params("VARCHAR", length_param)),
        "tinytext" => TypeMapping::lossless("VARCHAR(255)"),
        "text" | "mediumtext" | "longtext" => TypeMapping::lossless("TEXT"),

        // Binary types
        "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
            TypeMapping::lossless("BYTEA")
        }
        "bit" if t.params.is_none() || display_width_one => TypeMapping::lossless("BOOLEAN"),
        "bit" => TypeMapping::lossless("BYTEA"),

        // Date/time types
        "date" => TypeMapping::lossless("DATE"),
        "time" => TypeMapping::lossless("TIME"),
        "datetime" => TypeMapping::lossless("TIMESTAMP"),
        "timestamp" => TypeMapping::lossless("TIMESTAMPTZ"),
        "year" => TypeMapping::lossless("SMALLINT"),

        // JSON
        "json" => TypeMapping::lossless("JSONB"),

        "enum" => TypeMapping::lossy(
            "VARCHAR",
            format!("MySQL ENUM '{}' stored as VARCHAR without its value list", raw),
        ),
        "set" => TypeMapping::lossy(
            "VARCHAR",
            format!("MySQL SET '{}' stored as comma-separated VARCHAR", raw),
        ),

        // Spatial types
        "geometry" | "point" | "linestring" | "polygon" | "multipoint" | "multilinestring"
        | "multipolygon" | "geometrycollection" => TypeMapping::lossy(
            "TEXT",
            format!("MySQL spatial type '{}' stored as TEXT", raw),
        ),

        _ => TypeMapping::unknown("mysql", raw),
    }
}

/// SQL Server → RisingWave type mapper.
///
/// `TINYINT` is unsigned in SQL Server and widens to `SMALLINT`.
#[derive(Debug, Clone, Default)]
pub struct SqlServerToRisingWaveMapper;

impl SqlServerToRisingWaveMapper {
    /// Create a new SQL Server to RisingWave mapper.
    pub fn new() -> Self {
        Self
    }
}

impl TypeMapper for SqlServerToRisingWaveMapper {
    fn source_dialect(&self) -> &str {
        "sqlserver"
    }

    fn map_type(&self, native_type: &str, length_param: Option<u32>) -> TypeMapping {
        let native = NativeType::parse(native_type);
        map_with_arrays(&native, |t| sqlserver_to_risingwave(t, native_type, length_param))
    }
}

fn sqlserver_to_risingwave(t: &NativeType, raw: &str, length_param: Option<u32>) -> TypeMapping {
    match t.base.as_str() {
        // Integer types
        "tinyint" | "smallint" => TypeMapping::lossless("SMALLINT"),
        "int" => TypeMapping::lossless("INT"),
        "bigint" => TypeMapping::lossless("BIGINT"),
        "bit" => TypeMapping::lossless("BOOLEAN"),

        // Decimal/numeric
        "decimal" | "numeric" => TypeMapping::lossless(t.with_params("DECIMAL", None)),
        "money" => TypeMapping::lossless("DECIMAL(19,4)"),
        "smallmoney" => TypeMapping::lossless("DECIMAL(10,4)"),

        // Floating point
        "float" => TypeMapping::lossless("DOUBLE PRECISION"),
        "real" => TypeMapping::lossless("REAL"),

        // String types
        "char" | "nchar" | "varchar" | "nvarchar" => {
            TypeMapping::lossless(t.with_params("VARCHAR", length_param))
        }
        "text" | "ntext" | "xml" => TypeMapping::lossless("TEXT"),
        "uniqueidentifier" => TypeMapping::lossless("VARCHAR"),

        // Date/time types
        "date" => TypeMapping::lossless("DATE"),
        "time" => TypeMapping::lossless("TIME"),
        "datetime" | "datetime2" | "smalldatetime" => TypeMapping::lossless("TIMESTAMP"),
        "datetimeoffset" => TypeMapping::lossless("TIMESTAMPTZ"),

        // Binary types (rowversion is an 8-byte counter)
        "binary" | "varbinary" | "image" | "timestamp" | "rowversion" => {
            TypeMapping::lossless("BYTEA")
        }

        "sql_variant" | "hierarchyid" | "geometry" | "geography" => TypeMapping::lossy(
            "TEXT",
            format!("SQL Server type '{}' stored as TEXT", raw),
        ),

        _ => TypeMapping::unknown("sqlserver", raw),
    }
}

/// Passthrough mapper for synthetic schemas whose native types are already
/// RisingWave types (MongoDB `_id`/`payload`, declared Kafka columns).
#[derive(Debug, Clone)]
pub struct IdentityMapper {
    dialect: &'static str,
}

impl IdentityMapper {
    /// Create a new identity mapper for the given source.
    pub const fn new(dialect: &'static str) -> Self {
        Self { dialect }
    }
}

impl TypeMapper for IdentityMapper {
    fn source_dialect(&self) -> &str {
        self.dialect
    }

    fn map_type(&self, native_type: &str, _length_param: Option<u32>) -> TypeMapping {
        TypeMapping::lossless(native_type.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_mapper_uppercases() {
        let m = IdentityMapper::new("mongodb");
        assert_eq!(m.map_type("jsonb", None).target_type, "JSONB");
        assert_eq!(m.source_dialect(), "mongodb");
    }

    fn pg(t: &str) -> String {
        PostgresToRisingWaveMapper::new().map_type(t, None).target_type
    }

    fn my(t: &str) -> String {
        MysqlToRisingWaveMapper::new().map_type(t, None).target_type
    }

    fn ms(t: &str) -> String {
        SqlServerToRisingWaveMapper::new().map_type(t, None).target_type
    }

    // =========================================================================
    // PostgreSQL
    // =========================================================================

    #[test]
    fn test_postgres_integers() {
        assert_eq!(pg("int4"), "INT");
        assert_eq!(pg("integer"), "INT");
        assert_eq!(pg("int8"), "BIGINT");
        assert_eq!(pg("SMALLINT"), "SMALLINT");
    }

    #[test]
    fn test_postgres_params_preserved() {
        assert_eq!(pg("varchar(255)"), "VARCHAR(255)");
        assert_eq!(pg("character varying(40)"), "VARCHAR(40)");
        assert_eq!(pg("numeric(10,2)"), "DECIMAL(10,2)");
        assert_eq!(pg("numeric"), "DECIMAL");
    }

    #[test]
    fn test_postgres_length_param() {
        let m = PostgresToRisingWaveMapper::new();
        assert_eq!(m.map_type("varchar", Some(32)).target_type, "VARCHAR(32)");
        // explicit params win over the separate length
        assert_eq!(m.map_type("varchar(8)", Some(32)).target_type, "VARCHAR(8)");
        // length is ignored for types that do not take it
        assert_eq!(m.map_type("text", Some(32)).target_type, "TEXT");
    }

    #[test]
    fn test_postgres_arrays() {
        assert_eq!(pg("int4[]"), "INT[]");
        assert_eq!(pg("_int4"), "INT[]");
        assert_eq!(pg("text[][]"), "TEXT[][]");
    }

    #[test]
    fn test_postgres_time_zones() {
        assert_eq!(pg("timestamp with time zone"), "TIMESTAMPTZ");
        assert_eq!(pg("timestamp(6) without time zone"), "TIMESTAMP");
        let m = PostgresToRisingWaveMapper::new().map_type("timetz", None);
        assert_eq!(m.target_type, "TIME");
        assert!(m.is_lossy);
    }

    #[test]
    fn test_postgres_unknown_falls_back_with_warning() {
        let m = PostgresToRisingWaveMapper::new().map_type("tsvector", None);
        assert_eq!(m.target_type, "TEXT");
        assert!(m.warning.is_some());
    }

    // =========================================================================
    // MySQL
    // =========================================================================

    #[test]
    fn test_mysql_unsigned_widening() {
        assert_eq!(my("tinyint unsigned"), "SMALLINT");
        assert_eq!(my("smallint unsigned"), "INT");
        assert_eq!(my("mediumint unsigned"), "INT");
        assert_eq!(my("int(10) unsigned"), "BIGINT");
        assert_eq!(my("bigint(20) unsigned"), "DECIMAL");
    }

    #[test]
    fn test_mysql_signed_drops_display_width() {
        assert_eq!(my("int(11)"), "INT");
        assert_eq!(my("bigint"), "BIGINT");
        assert_eq!(my("smallint(6)"), "SMALLINT");
    }

    #[test]
    fn test_mysql_tinyint_one_is_boolean() {
        assert_eq!(my("tinyint(1)"), "BOOLEAN");
        assert_eq!(my("tinyint(4)"), "SMALLINT");
        assert_eq!(my("tinyint(1) unsigned"), "SMALLINT");
    }

    #[test]
    fn test_mysql_strings_and_time() {
        assert_eq!(my("varchar(100)"), "VARCHAR(100)");
        assert_eq!(my("tinytext"), "VARCHAR(255)");
        assert_eq!(my("longtext"), "TEXT");
        assert_eq!(my("datetime(3)"), "TIMESTAMP");
        assert_eq!(my("timestamp"), "TIMESTAMPTZ");
        assert_eq!(my("json"), "JSONB");
    }

    #[test]
    fn test_mysql_enum_is_lossy() {
        let m = MysqlToRisingWaveMapper::new().map_type("enum('a','b')", None);
        assert_eq!(m.target_type, "VARCHAR");
        assert!(m.is_lossy);
    }

    // =========================================================================
    // SQL Server
    // =========================================================================

    #[test]
    fn test_sqlserver_types() {
        assert_eq!(ms("tinyint"), "SMALLINT");
        assert_eq!(ms("bit"), "BOOLEAN");
        assert_eq!(ms("money"), "DECIMAL(19,4)");
        assert_eq!(ms("nvarchar(50)"), "VARCHAR(50)");
        assert_eq!(ms("nvarchar(max)"), "VARCHAR");
        assert_eq!(ms("datetimeoffset"), "TIMESTAMPTZ");
        assert_eq!(ms("uniqueidentifier"), "VARCHAR");
    }

    #[test]
    fn test_sqlserver_unknown() {
        let m = SqlServerToRisingWaveMapper::new().map_type("vector(3)", None);
        assert_eq!(m.target_type, "TEXT");
        assert!(m.warning.unwrap().contains("vector(3)"));
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(PostgresToRisingWaveMapper::new().source_dialect(), "postgres");
        assert_eq!(MysqlToRisingWaveMapper::new().target_dialect(), "risingwave");
    }
}
