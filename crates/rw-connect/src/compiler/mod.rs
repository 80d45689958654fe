//! Pipeline compiler - turns one configuration into ordered DDL.
//!
//! Compilation is batch oriented: every unit (the source, each selected
//! table, each sink) is validated and built on its own, and a failing unit
//! never stops the others. Only a table selection failure aborts the run.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{KafkaRelation, PipelineConfig, SinkConfig, SinkSpec, SourceConfig};
use crate::core::schema::{ColumnInfo, TableInfo, PLACEHOLDER_COMMENT};
use crate::core::traits::{Discovery, TypeMapper};
use crate::ddl::naming::{fan_out_name, sink_name, source_name};
use crate::ddl::{
    build_kafka_statement, build_sink_statement, build_source_statement, build_table_statement,
    target_table_name, SinkTarget, Statement,
};
use crate::dialect::IdentityMapper;
use crate::discovery::{mongodb_columns, SchemaSnapshot};
use crate::error::{ConnectError, Result};
use crate::selection::{PatternMatcher, TableSelector};
use crate::validate::{
    validate_columns, validate_sink, validate_source, ColumnPlan, ValidatedSource, ValidationIssue,
    ValidationMode,
};

static MONGODB_MAPPER: IdentityMapper = IdentityMapper::new("mongodb");

/// Options that change how a pipeline is compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Live checks requested columns against discovery; DryRun trusts them.
    pub mode: ValidationMode,
    /// Fail when an explicitly listed table is not discovered.
    pub strict_selection: bool,
}

/// Kind of object a unit creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Source,
    Table,
    Sink,
}

/// Outcome of one compilation unit.
///
/// `statement` is only set when `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitResult {
    pub unit: String,
    pub kind: UnitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<Statement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationIssue>,
}

impl UnitResult {
    fn new(unit: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            unit: unit.into(),
            kind,
            statement: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, field: &str, err: ConnectError) {
        match err {
            ConnectError::Validation(report) => {
                self.errors.extend(report.errors);
                self.warnings.extend(report.warnings);
            }
            other => self.errors.push(ValidationIssue::new(field, other.to_string())),
        }
    }

    /// Attach the built statement, unless an error was already recorded.
    fn attach(&mut self, field: &str, statement: Result<Statement>) {
        match statement {
            Ok(statement) if self.errors.is_empty() => {
                self.unit = statement.name.clone();
                self.statement = Some(statement);
            }
            Ok(_) => {}
            Err(e) => self.record(field, e),
        }
    }

    fn finish(mut self) -> Self {
        for warning in &self.warnings {
            warn!("{}: {}", self.unit, warning);
        }
        if !self.errors.is_empty() {
            self.statement = None;
            for error in &self.errors {
                warn!("{} failed: {}", self.unit, error);
            }
        }
        self
    }
}

/// Everything one compilation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileOutput {
    /// SHA256 of the configuration the output was built from.
    pub config_hash: String,

    /// The shared source object; `None` when the source is a Kafka topic
    /// stored as a table, which is reported under `tables`.
    pub source: Option<UnitResult>,

    pub tables: Vec<UnitResult>,

    pub sinks: Vec<UnitResult>,
}

impl CompileOutput {
    /// Every unit in emission order.
    pub fn units(&self) -> impl Iterator<Item = &UnitResult> {
        self.source.iter().chain(&self.tables).chain(&self.sinks)
    }

    /// Successful statements in emission order.
    pub fn statements(&self) -> Vec<&Statement> {
        self.units().filter_map(|u| u.statement.as_ref()).collect()
    }

    pub fn failed_units(&self) -> Vec<&UnitResult> {
        self.units().filter(|u| !u.succeeded()).collect()
    }

    pub fn warning_count(&self) -> usize {
        self.units().map(|u| u.warnings.len()).sum()
    }

    /// All successful statements as one script, setup statements first.
    pub fn to_sql_script(&self) -> String {
        let hash = self.config_hash.get(..12).unwrap_or(&self.config_hash);
        let mut script = format!("-- rw-connect, config {}\n", hash);
        for statement in self.statements() {
            script.push('\n');
            script.push_str(&statement.render());
            script.push('\n');
        }
        script
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// `Err(Compile)` when any unit failed.
    pub fn ensure_success(&self) -> Result<()> {
        let failed = self.failed_units().len();
        if failed == 0 {
            Ok(())
        } else {
            Err(ConnectError::Compile {
                failed,
                total: self.units().count(),
            })
        }
    }
}

/// Compiles one pipeline configuration.
pub struct Compiler {
    config: PipelineConfig,
    options: CompileOptions,
}

impl Compiler {
    pub fn new(config: PipelineConfig, options: CompileOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    fn selector(&self) -> Result<TableSelector> {
        let strict = self.options.strict_selection || self.config.tables.strict;
        Ok(TableSelector::new(&self.config.tables.policy(), self.config.source.default_schema())?
            .strict(strict))
    }

    /// Tables of `snapshot` the configuration selects, in output order.
    pub fn select_tables(&self, snapshot: &SchemaSnapshot) -> Result<Vec<TableInfo>> {
        if matches!(self.config.source, SourceConfig::Kafka(_)) {
            return Ok(Vec::new());
        }
        let discovered = self
            .config
            .source
            .discovery_schemas()
            .iter()
            .flat_map(|schema| snapshot.tables_in(schema))
            .collect();
        self.selector()?.select(&self.candidates(discovered)?)
    }

    /// Drop MongoDB collections that no `collection_name` pattern covers.
    fn candidates(&self, discovered: Vec<TableInfo>) -> Result<Vec<TableInfo>> {
        let SourceConfig::MongoDb(c) = &self.config.source else {
            return Ok(discovered);
        };
        let patterns = c
            .collection_patterns()
            .map(PatternMatcher::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(discovered
            .into_iter()
            .filter(|t| {
                let name = t.qualified_name();
                patterns.iter().any(|p| p.matches(&name))
            })
            .collect())
    }

    /// Compile against pre-fetched metadata.
    ///
    /// Fails only when table selection fails; unit failures are reported in
    /// the output.
    pub fn compile(&self, snapshot: &SchemaSnapshot) -> Result<CompileOutput> {
        let source_config = &self.config.source;
        info!(
            "Compiling {} pipeline for source {}",
            source_config.kind(),
            source_name(source_config)
        );

        let mut output = CompileOutput {
            config_hash: self.config.hash(),
            source: None,
            tables: Vec::new(),
            sinks: Vec::new(),
        };

        match validate_source(source_config) {
            Ok(checked) => {
                let source_warnings = checked.warnings;
                let source = checked.value;
                if let SourceConfig::Kafka(c) = source.config() {
                    let kind = match c.relation {
                        KafkaRelation::Table => UnitKind::Table,
                        KafkaRelation::Source => UnitKind::Source,
                    };
                    let mut unit = UnitResult::new(source.name(), kind);
                    unit.warnings = source_warnings;
                    unit.attach(
                        "source",
                        build_kafka_statement(&source, &self.config.table_options.includes),
                    );
                    match kind {
                        UnitKind::Table => output.tables.push(unit.finish()),
                        _ => output.source = Some(unit.finish()),
                    }
                } else {
                    let mut unit = UnitResult::new(source.name(), UnitKind::Source);
                    unit.warnings = source_warnings;
                    unit.attach("source", build_source_statement(&source));
                    output.source = Some(unit.finish());

                    let selected = self.select_tables(snapshot)?;
                    info!("Selected {} tables", selected.len());
                    for table in &selected {
                        output.tables.push(self.compile_table(&source, table, snapshot));
                    }
                }
            }
            Err(report) => {
                let mut unit = UnitResult::new(source_name(source_config), UnitKind::Source);
                unit.record("source", report.into());
                output.source = Some(unit.finish());

                for table in self.select_tables(snapshot)? {
                    let target =
                        target_table_name(&table, self.config.column_config(&table), &self.config.table_options);
                    let mut unit = UnitResult::new(target, UnitKind::Table);
                    unit.errors.push(ValidationIssue::new(
                        "source",
                        "skipped: source configuration is invalid",
                    ));
                    output.tables.push(unit.finish());
                }
            }
        }

        for spec in &self.config.sinks {
            output.sinks.extend(self.compile_sink(spec));
        }

        info!(
            "Compiled {} statements ({} failed units, {} warnings)",
            output.statements().len(),
            output.failed_units().len(),
            output.warning_count()
        );
        Ok(output)
    }

    fn compile_table(&self, source: &ValidatedSource, table: &TableInfo, snapshot: &SchemaSnapshot) -> UnitResult {
        let column_config = self.config.column_config(table);
        let options = &self.config.table_options;
        let target = target_table_name(table, column_config, options);
        let mut unit = UnitResult::new(target.clone(), UnitKind::Table);

        if table.is_placeholder() {
            unit.warnings.push(ValidationIssue::new(
                format!("tables.{}", table.qualified_name()),
                PLACEHOLDER_COMMENT,
            ));
        }

        let is_mongo = matches!(source.config(), SourceConfig::MongoDb(_));
        let mongo_columns;
        let (discovered, mapper): (&[ColumnInfo], &dyn TypeMapper) = match source.config().dialect() {
            Some(dialect) => (
                snapshot.columns_for(&table.table).unwrap_or_default(),
                dialect.mapper(),
            ),
            None => {
                mongo_columns = mongodb_columns();
                (mongo_columns.as_slice(), &MONGODB_MAPPER as &dyn TypeMapper)
            }
        };

        let requested = column_config.and_then(|c| c.selected_columns.as_deref());
        let plan: Option<ColumnPlan> = match requested {
            Some(selection) => {
                match validate_columns(table, discovered, selection, mapper, self.options.mode) {
                    Ok(checked) => {
                        unit.warnings.extend(checked.warnings);
                        Some(checked.value)
                    }
                    Err(report) => {
                        unit.record("columns", report.into());
                        None
                    }
                }
            }
            None if options.expand_columns && !is_mongo && !discovered.is_empty() => {
                let checked = ColumnPlan::from_discovered(discovered, mapper);
                unit.warnings.extend(checked.warnings);
                Some(checked.value)
            }
            None => None,
        };

        debug!(
            "{}: {} planned columns",
            table.qualified_name(),
            plan.as_ref().map_or(0, |p| p.columns().len())
        );
        if unit.succeeded() {
            unit.attach("table", build_table_statement(source, table, plan.as_ref(), options, &target));
        }
        unit.finish()
    }

    fn compile_sink(&self, spec: &SinkSpec) -> Vec<UnitResult> {
        let targets: Vec<(Option<&str>, SinkTarget)> = match &spec.query {
            Some(query) => vec![(None, SinkTarget::Query(query.clone()))],
            None => spec
                .from
                .iter()
                .map(|table| {
                    let target = match spec.queries.get(table) {
                        Some(query) => SinkTarget::Query(query.clone()),
                        None => SinkTarget::Table(table.clone()),
                    };
                    (Some(table.as_str()), target)
                })
                .collect(),
        };

        let fan_out = targets.len() > 1;
        let base = sink_name(&spec.sink);
        targets
            .into_iter()
            .map(|(table, target)| {
                let mut config = spec.sink.clone();
                if let (true, Some(table)) = (fan_out, table) {
                    config.set_name(fan_out_name(&base, table));
                    if let SinkConfig::Iceberg(c) = &mut config {
                        c.table_name = fan_out_name(&c.table_name, table);
                    }
                }
                compile_sink_unit(&config, &target)
            })
            .collect()
    }

    /// Fetch metadata through `discovery`, then [`compile`](Self::compile).
    ///
    /// Columns are fetched only for selected tables that need them. A table
    /// whose columns cannot be fetched is logged and compiled without them.
    pub async fn compile_with_discovery(&self, discovery: &dyn Discovery) -> Result<CompileOutput> {
        if matches!(self.config.source, SourceConfig::Kafka(_)) {
            return self.compile(&SchemaSnapshot::default());
        }
        if !discovery.test_connection().await {
            return Err(ConnectError::discovery(format!(
                "cannot reach {} source {}",
                self.config.source.kind(),
                source_name(&self.config.source)
            )));
        }

        let mut tables = Vec::new();
        for schema in self.config.source.discovery_schemas() {
            let listed = discovery.list_tables(&schema).await?;
            info!("Discovered {} tables in {}", listed.len(), schema);
            tables.extend(listed);
        }

        let selected = self.selector()?.select(&self.candidates(tables.clone())?)?;
        let needs_columns: Vec<TableInfo> = selected
            .into_iter()
            .filter(|t| !t.is_placeholder() && self.needs_columns(t))
            .collect();

        let concurrency = self.config.discovery.concurrency();
        debug!(
            "Fetching columns for {} tables ({} concurrent)",
            needs_columns.len(),
            concurrency
        );
        let fetched: Vec<(TableInfo, Result<Vec<ColumnInfo>>)> = stream::iter(needs_columns)
            .map(|table| async move {
                let columns = discovery.list_columns(&table.table).await;
                (table, columns)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut snapshot = SchemaSnapshot {
            tables,
            ..Default::default()
        };
        for (table, columns) in fetched {
            match columns {
                Ok(columns) => {
                    snapshot.columns.insert(table.qualified_name(), columns);
                }
                Err(e) => warn!("Failed to fetch columns for {}: {}", table.qualified_name(), e),
            }
        }

        self.compile(&snapshot)
    }

    fn needs_columns(&self, table: &TableInfo) -> bool {
        if self.config.source.dialect().is_none() {
            return false;
        }
        let requested = self
            .config
            .column_config(table)
            .is_some_and(|c| c.selected_columns.is_some());
        requested || self.config.table_options.expand_columns
    }
}

fn compile_sink_unit(config: &SinkConfig, target: &SinkTarget) -> UnitResult {
    let mut unit = UnitResult::new(sink_name(config), UnitKind::Sink);
    match validate_sink(config) {
        Ok(checked) => {
            unit.warnings.extend(checked.warnings);
            unit.attach("sink", build_sink_statement(&checked.value, target));
        }
        Err(report) => unit.record("sink", report.into()),
    }
    unit.finish()
}
