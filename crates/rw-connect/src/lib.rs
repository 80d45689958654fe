//! # rw-connect
//!
//! Compiles connector configurations into RisingWave DDL.
//!
//! A pipeline configuration names one upstream source (PostgreSQL, MySQL,
//! SQL Server, MongoDB or Kafka), which of its tables to capture, and the
//! sinks fed from them. The library turns it into ordered
//! `CREATE SOURCE` / `CREATE TABLE` / `CREATE SINK` statements:
//!
//! - **Table selection** by explicit list, include-all or glob patterns
//! - **Column validation** of requested columns and primary keys against
//!   discovered metadata
//! - **Type mapping** from each source dialect to RisingWave types
//! - **Connector rules** for every source and sink family
//! - **Batch compilation** where one failing unit never hides the others
//!
//! The compiler never opens connections. Metadata comes from a
//! [`Discovery`] implementation or a [`SchemaSnapshot`] file.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rw_connect::{CompileOptions, Compiler, PipelineConfig, SchemaSnapshot};
//!
//! fn main() -> rw_connect::Result<()> {
//!     let config = PipelineConfig::load("pipeline.yaml")?;
//!     let snapshot = SchemaSnapshot::load("schema.yaml")?;
//!     let output = Compiler::new(config, CompileOptions::default()).compile(&snapshot)?;
//!     print!("{}", output.to_sql_script());
//!     output.ensure_success()
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod core;
pub mod ddl;
pub mod dialect;
pub mod discovery;
pub mod error;
pub mod selection;
pub mod validate;

// Re-exports for convenient access
pub use compiler::{CompileOptions, CompileOutput, Compiler, UnitKind, UnitResult};
pub use config::{PipelineConfig, SinkConfig, SourceConfig};
pub use core::{ColumnInfo, ColumnSelection, Discovery, TableInfo, TableRef, TypeMapper};
pub use ddl::Statement;
pub use discovery::SchemaSnapshot;
pub use error::{ConnectError, Result};
pub use selection::{SelectionPolicy, TableSelection, TableSelector};
pub use validate::{ValidationIssue, ValidationMode, ValidationReport};
