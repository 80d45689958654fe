//! Core traits at the boundaries of the compiler.
//!
//! - [`Discovery`]: reads table and column metadata from a source system
//! - [`TypeMapper`]: maps a source dialect's native types to RisingWave types
//!
//! # Design Patterns
//!
//! - **Strategy**: each source dialect ships its own `TypeMapper`
//! - **Template Method**: `map_column` is defined once on top of `map_type`

use async_trait::async_trait;

use crate::error::Result;

use super::schema::{ColumnInfo, TableInfo, TableRef};

/// Schema discovery against a source system.
///
/// The compiler itself never opens connections. Implementations either talk
/// to a live database or serve a pre-fetched
/// [`SchemaSnapshot`](crate::discovery::SchemaSnapshot).
#[async_trait]
pub trait Discovery: Send + Sync {
    /// List tables (collections, topics) in a schema.
    async fn list_tables(&self, schema: &str) -> Result<Vec<TableInfo>>;

    /// List the columns of one table, in any order.
    async fn list_columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>>;

    /// Check that the source is reachable.
    async fn test_connection(&self) -> bool;
}

/// Maps native column types of one source dialect to RisingWave types.
pub trait TypeMapper: Send + Sync {
    /// Get the source dialect name.
    fn source_dialect(&self) -> &str;

    /// Get the target dialect name.
    fn target_dialect(&self) -> &str {
        "risingwave"
    }

    /// Map a native type name.
    ///
    /// `length_param` is a character length reported outside the type name;
    /// it is only used when the type name carries no parameters itself.
    fn map_type(&self, native_type: &str, length_param: Option<u32>) -> TypeMapping;

    /// Map a discovered column.
    fn map_column(&self, col: &ColumnInfo) -> TypeMapping {
        self.map_type(&col.native_type, col.max_length)
    }
}

/// Type used when a native type is unknown.
pub const FALLBACK_TYPE: &str = "TEXT";

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "VARCHAR(255)", "BIGINT").
    pub target_type: String,
    /// Whether this mapping loses data or precision.
    pub is_lossy: bool,
    /// Warning message for lossy or fallback mappings.
    pub warning: Option<String>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: false,
            warning: None,
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: true,
            warning: Some(warning.into()),
        }
    }

    /// Fallback for a type the mapper does not know.
    pub fn unknown(dialect: &str, native_type: &str) -> Self {
        Self::lossy(
            FALLBACK_TYPE,
            format!(
                "unknown {} type '{}', mapped to {}",
                dialect, native_type, FALLBACK_TYPE
            ),
        )
    }
}
