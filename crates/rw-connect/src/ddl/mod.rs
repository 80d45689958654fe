//! DDL synthesis for RisingWave.
//!
//! Builders take validated inputs only ([`ValidatedSource`], [`ValidatedSink`],
//! [`ColumnPlan`]) and return a [`Statement`]. Output is a pure function of
//! the inputs: compiling the same config twice yields identical text.
//!
//! [`ValidatedSource`]: crate::validate::ValidatedSource
//! [`ValidatedSink`]: crate::validate::ValidatedSink
//! [`ColumnPlan`]: crate::validate::ColumnPlan

pub mod format;
pub mod include;
pub mod kafka;
pub mod naming;
pub mod sink;
pub mod source;
pub mod table;
pub mod with_options;

pub use format::FormatClause;
pub use include::{render_includes, IncludeTarget, MetadataColumn, MetadataInclude};
pub use kafka::build_kafka_statement;
pub use sink::{build_sink_statement, SinkTarget};
pub use source::build_source_statement;
pub use table::{build_table_statement, target_table_name};
pub use with_options::WithOptions;

use serde::Serialize;
use std::fmt;

/// One generated CREATE statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Name of the created object, as emitted.
    pub name: String,

    /// Session statements that must run before `sql`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub setup: Vec<String>,

    pub sql: String,
}

impl Statement {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            setup: Vec::new(),
            sql: sql.into(),
        }
    }

    pub fn with_setup(mut self, setup: impl Into<String>) -> Self {
        self.setup.push(setup.into());
        self
    }

    /// Setup statements followed by the CREATE, one per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for setup in &self.setup {
            out.push_str(setup);
            out.push('\n');
        }
        out.push_str(&self.sql);
        out
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a column block body: one definition per line, single PK inlined,
/// composite PK as a trailing constraint.
pub(crate) fn column_lines<'a, I>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = ColumnDef<'a>>,
{
    let columns: Vec<ColumnDef<'a>> = columns.into_iter().collect();
    let pk: Vec<&str> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| c.name.as_str())
        .collect();

    let mut lines: Vec<String> = columns
        .iter()
        .map(|c| {
            let mut line = format!("{}{} {}", with_options::INDENT, c.name, c.data_type);
            if c.primary_key && pk.len() == 1 {
                line.push_str(" PRIMARY KEY");
            } else if !c.nullable {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect();

    if pk.len() > 1 {
        lines.push(format!("{}PRIMARY KEY ({})", with_options::INDENT, pk.join(", ")));
    }
    lines
}

/// A column definition with its name already quoted.
#[derive(Debug, Clone)]
pub(crate) struct ColumnDef<'a> {
    pub name: String,
    pub data_type: &'a str,
    pub nullable: bool,
    pub primary_key: bool,
}
