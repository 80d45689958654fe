//! Core abstractions shared by every stage of the compiler.
//!
//! - [`schema`]: discovered table/column metadata and column requests
//! - [`identifier`]: identifier quoting and literal escaping
//! - [`traits`]: discovery and type mapping boundaries

pub mod identifier;
pub mod schema;
pub mod traits;

pub use schema::{
    ColumnInfo, ColumnSelection, TableColumnConfig, TableInfo, TableRef, TableType,
    PLACEHOLDER_COMMENT,
};
pub use traits::{Discovery, TypeMapper, TypeMapping, FALLBACK_TYPE};
