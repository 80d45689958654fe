//! rw-connect CLI - compile connector configurations into RisingWave DDL.

use clap::{Parser, Subcommand};
use rw_connect::{
    CompileOptions, CompileOutput, Compiler, ConnectError, PipelineConfig, SchemaSnapshot,
    ValidationMode, ValidationReport,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "rw-connect")]
#[command(about = "Compile connector configurations into RisingWave source, table and sink DDL")]
#[command(version)]
struct Cli {
    /// Path to YAML pipeline configuration
    #[arg(short, long, default_value = "pipeline.yaml")]
    config: PathBuf,

    /// Schema snapshot (YAML or JSON) used instead of a live connection
    #[arg(long)]
    schema_file: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate DDL for the source, selected tables and sinks
    Compile {
        /// Trust column overrides instead of checking them against discovery
        #[arg(long)]
        dry_run: bool,

        /// Fail when an explicitly listed table is not discovered
        #[arg(long)]
        strict: bool,

        /// Write the SQL script to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the configuration without emitting DDL
    Validate {
        /// Trust column overrides instead of checking them against discovery
        #[arg(long)]
        dry_run: bool,
    },

    /// List the tables the configuration selects
    Tables,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ConnectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(ConnectError::Config)?;

    let config = PipelineConfig::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let snapshot = match &cli.schema_file {
        Some(path) => Some(load_snapshot(path)?),
        None => None,
    };

    match cli.command {
        Commands::Compile {
            dry_run,
            strict,
            output,
        } => {
            let mode = validation_mode(dry_run, snapshot.as_ref())?;
            let compiler = Compiler::new(
                config,
                CompileOptions {
                    mode,
                    strict_selection: strict,
                },
            );
            let result = compile(&compiler, snapshot.as_ref()).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                let script = result.to_sql_script();
                match output {
                    Some(path) => {
                        std::fs::write(&path, script)?;
                        info!("Wrote {} statements to {:?}", result.statements().len(), path);
                    }
                    None => print!("{}", script),
                }
            }
            result.ensure_success()?;
        }

        Commands::Validate { dry_run } => {
            let mode = validation_mode(dry_run, snapshot.as_ref())?;
            let compiler = Compiler::new(
                config,
                CompileOptions {
                    mode,
                    ..Default::default()
                },
            );
            let result = compile(&compiler, snapshot.as_ref()).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                print_issues(&result);
            }

            let mut report = ValidationReport::default();
            for unit in result.units() {
                for issue in &unit.errors {
                    report.fail(format!("{}: {}", unit.unit, issue.field), issue.message.clone());
                }
            }
            if !report.is_valid() {
                return Err(report.into());
            }
            if !cli.output_json {
                println!("Configuration is valid ({} warnings)", result.warning_count());
            }
        }

        Commands::Tables => {
            let compiler = Compiler::new(config, CompileOptions::default());
            let tables = compiler.select_tables(&snapshot.unwrap_or_default())?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&tables)?);
            } else {
                for table in &tables {
                    match &table.comment {
                        Some(comment) => println!("{}  ({})", table.qualified_name(), comment),
                        None => println!("{}", table.qualified_name()),
                    }
                }
                println!("\n{} tables selected", tables.len());
            }
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<SchemaSnapshot, ConnectError> {
    let snapshot = SchemaSnapshot::load(path)?;
    info!(
        "Loaded schema snapshot from {:?} ({} tables)",
        path,
        snapshot.tables.len()
    );
    Ok(snapshot)
}

/// Column checks need discovered metadata unless dry-run is asked for.
fn validation_mode(
    dry_run: bool,
    snapshot: Option<&SchemaSnapshot>,
) -> Result<ValidationMode, ConnectError> {
    match (dry_run, snapshot) {
        (true, _) => {
            info!("Dry-run mode: column overrides are not checked against discovery");
            Ok(ValidationMode::DryRun)
        }
        (false, Some(_)) => Ok(ValidationMode::Live),
        (false, None) => Err(ConnectError::Config(
            "no schema metadata: pass --schema-file, or --dry-run to skip column checks".into(),
        )),
    }
}

async fn compile(
    compiler: &Compiler,
    snapshot: Option<&SchemaSnapshot>,
) -> Result<CompileOutput, ConnectError> {
    match snapshot {
        Some(snapshot) => compiler.compile_with_discovery(snapshot).await,
        None => compiler.compile(&SchemaSnapshot::default()),
    }
}

fn print_issues(result: &CompileOutput) {
    for unit in result.units() {
        for issue in &unit.errors {
            println!("error    {}: {}", unit.unit, issue);
        }
        for issue in &unit.warnings {
            println!("warning  {}: {}", unit.unit, issue);
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("unknown verbosity '{}'", other)),
    };

    // stdout carries the generated SQL
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}'", other)),
    }

    Ok(())
}
