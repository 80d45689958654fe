//! Source dialects and their type mappers.
//!
//! # Available Mappers
//!
//! - [`PostgresToRisingWaveMapper`]: PostgreSQL → RisingWave
//! - [`MysqlToRisingWaveMapper`]: MySQL → RisingWave (unsigned widening)
//! - [`SqlServerToRisingWaveMapper`]: SQL Server → RisingWave
//! - [`IdentityMapper`]: passthrough for synthetic schemas
//!
//! MongoDB and Kafka have no mapping table: their tables use fixed synthetic schemas.
//!
//! # Usage
//!
//! ```rust
//! use rw_connect::dialect::{map_type, SourceDialect};
//!
//! let mapping = map_type(SourceDialect::Postgres, "varchar(255)", None);
//! assert_eq!(mapping.target_type, "VARCHAR(255)");
//! ```

mod native;
mod typemap;

pub use native::NativeType;
pub use typemap::{
    IdentityMapper, MysqlToRisingWaveMapper, PostgresToRisingWaveMapper,
    SqlServerToRisingWaveMapper,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::traits::{TypeMapper, TypeMapping};
use crate::error::{ConnectError, Result};

static POSTGRES: PostgresToRisingWaveMapper = PostgresToRisingWaveMapper;
static MYSQL: MysqlToRisingWaveMapper = MysqlToRisingWaveMapper;
static SQLSERVER: SqlServerToRisingWaveMapper = SqlServerToRisingWaveMapper;

/// Relational source dialects with a type mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDialect {
    Postgres,
    Mysql,
    SqlServer,
}

impl SourceDialect {
    /// Parse a dialect name, accepting common aliases.
    pub fn from_db_type(db_type: &str) -> Result<Self> {
        match db_type.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(SourceDialect::Postgres),
            "mysql" | "mariadb" => Ok(SourceDialect::Mysql),
            "sqlserver" | "mssql" | "sql_server" => Ok(SourceDialect::SqlServer),
            other => Err(ConnectError::Config(format!(
                "Unknown source dialect '{}'. Valid values: postgres, mysql, sqlserver",
                other
            ))),
        }
    }

    /// The type mapper for this dialect.
    pub fn mapper(self) -> &'static dyn TypeMapper {
        match self {
            SourceDialect::Postgres => &POSTGRES,
            SourceDialect::Mysql => &MYSQL,
            SourceDialect::SqlServer => &SQLSERVER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceDialect::Postgres => "postgres",
            SourceDialect::Mysql => "mysql",
            SourceDialect::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a native type of `dialect` to a RisingWave type.
pub fn map_type(dialect: SourceDialect, native_type: &str, length_param: Option<u32>) -> TypeMapping {
    dialect.mapper().map_type(native_type, length_param)
}
