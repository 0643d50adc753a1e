//! CLI command implementations
//!
//! Each command builds its response value; `run_command` writes it to
//! stdout. Failures are written as an error response and returned.

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::TableConfig;
use crate::datasource::{LineTerminator, Origin, TabularDataSource};
use crate::inference::TypeInferrer;
use crate::observability::Logger;
use crate::schema::SchemaLoader;

use super::args::{Command, SourceArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let (outcome, failure) = match execute(cmd) {
        Ok(outcome) => outcome,
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            return Err(e);
        }
    };

    write_response(outcome)?;
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Runs a command and returns its response. A command may produce a
/// response and still fail (validation with violations).
fn execute(cmd: Command) -> CliResult<(Value, Option<CliError>)> {
    match cmd {
        Command::Infer {
            source,
            out,
            sample_rows,
        } => infer(&source, out, sample_rows).map(|v| (v, None)),
        Command::Validate {
            source,
            schema,
            fail_fast,
        } => validate(&source, schema, fail_fast),
        Command::Convert {
            source,
            out,
            columns,
            schema,
            lf,
        } => convert(&source, out, columns, schema, lf).map(|v| (v, None)),
    }
}

/// Settings and data source shared by every command
struct Context {
    config: TableConfig,
    source: TabularDataSource,
}

impl Context {
    fn new(args: &SourceArgs) -> CliResult<Self> {
        let mut config = match &args.config {
            Some(path) => TableConfig::load(path)?,
            None => TableConfig::default(),
        };
        if let Some(root) = &args.root {
            config.working_root = root.clone();
        }
        Logger::set_min_severity(config.severity()?);

        let origin = if args.input.starts_with("http://") || args.input.starts_with("https://") {
            Origin::Url(args.input.clone())
        } else if let Some(entry) = &args.entry {
            Origin::Archive {
                archive: PathBuf::from(&args.input),
                entry: entry.clone(),
            }
        } else {
            Origin::File(PathBuf::from(&args.input))
        };

        let mut source = TabularDataSource::new(origin, config.working_root.clone())
            .with_dialect(config.dialect.clone());
        source.set_header(args.header.clone());

        Ok(Self { config, source })
    }

    fn loader(&self) -> SchemaLoader {
        SchemaLoader::new(self.config.working_root.clone())
    }
}

/// Infer a schema from the input table
///
/// Response: `{"schema": <document>, "saved": <path>?}`
pub fn infer(args: &SourceArgs, out: Option<PathBuf>, sample_rows: Option<usize>) -> CliResult<Value> {
    let ctx = Context::new(args)?;
    let mut options = ctx.config.infer_options();
    if let Some(rows) = sample_rows {
        if rows == 0 {
            return Err(CliError::config_error("sample_rows must be > 0"));
        }
        options.sample_rows = rows;
    }

    let schema = TypeInferrer::new(options).infer_from_source(&ctx.source)?;
    let mut response = json!({ "schema": serde_json::to_value(&schema)? });

    if let Some(path) = out {
        let saved = ctx.loader().save(&schema, path)?;
        response["saved"] = json!(saved.display().to_string());
    }

    Ok(response)
}

/// Validate the input table against a schema document
///
/// Response: the validation report. Violations make the command fail
/// after the report is written.
pub fn validate(args: &SourceArgs, schema_path: PathBuf, fail_fast: bool) -> CliResult<(Value, Option<CliError>)> {
    let ctx = Context::new(args)?;
    let schema = ctx.loader().load(schema_path)?;

    let mut options = ctx.config.validate_options();
    options.fail_fast |= fail_fast;

    let report = schema.validate(&ctx.source, &options)?;
    let failure = (!report.is_valid()).then(|| CliError::validation_failed(report.error_count()));
    Ok((serde_json::to_value(&report)?, failure))
}

/// Rewrite the input table with columns in the requested order
///
/// Response: `{"rows": <count>, "columns": [...], "out": <path>}`
pub fn convert(
    args: &SourceArgs,
    out: PathBuf,
    columns: Option<Vec<String>>,
    schema_path: Option<PathBuf>,
    lf: bool,
) -> CliResult<Value> {
    let mut ctx = Context::new(args)?;
    if lf {
        let dialect = ctx.source.dialect().clone().with_line_terminator(LineTerminator::Lf);
        ctx.source.set_dialect(dialect);
    }

    let (rows, output_header) = match (columns, schema_path) {
        (Some(columns), _) => (ctx.source.write_to_path(&out, Some(&columns))?, columns),
        (None, Some(path)) => {
            let schema = ctx.loader().load(path)?;
            (schema.write_to_path(&ctx.source, &out)?, schema.output_headers())
        }
        (None, None) => (ctx.source.write_to_path(&out, None)?, ctx.source.header()?.to_vec()),
    };

    Ok(json!({
        "rows": rows,
        "columns": output_header,
        "out": out.display().to_string(),
    }))
}
