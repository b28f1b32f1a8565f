// SPDX-License-Identifier: MIT OR Apache-2.0
//! `math-formula`: compile an RPN formula into a geometry node graph.
//!
//! ```bash
//! math-formula "4 5 + position * -> result"
//! math-formula --settings formula.ron --format json
//! RUST_LOG=math_formula=debug math-formula "(1 2 3) normalize"
//! ```
//!
//! The report goes to stdout, logs go to stderr. The process exits with
//! status 2 when the build was cancelled.

mod report;

use clap::Parser;
use math_formula::{CompileStatus, FormulaCompiler, FormulaError, FormulaSettings, SettingsError};
use math_formula_graph::Graph;
use report::{OutputFormat, RenderError, Report};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "math-formula")]
#[command(version)]
#[command(about = "Compile an RPN math formula into attribute math nodes")]
struct Cli {
    /// Formula in Reverse Polish Notation; overrides the settings file
    formula: Option<String>,

    /// RON settings file
    #[arg(long, short)]
    settings: Option<PathBuf>,

    /// Prefix of intermediate result attributes
    #[arg(long)]
    temp_attr: Option<String>,

    /// Do not put the nodes in a frame
    #[arg(long)]
    no_frame: bool,

    /// Report format
    #[arg(long, short = 'o', default_value = "text", value_enum)]
    format: OutputFormat,

    /// Log every emitted node
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    /// Settings file first, then flags on top
    fn settings(&self) -> Result<FormulaSettings, CliError> {
        let mut settings = match &self.settings {
            Some(path) => FormulaSettings::load(path)?,
            None => FormulaSettings::default(),
        };

        if let Some(formula) = &self.formula {
            settings.formula.clone_from(formula);
        }
        if let Some(name) = &self.temp_attr {
            settings.temp_attr_name.clone_from(name);
        }
        if self.no_frame {
            settings.add_frame = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(report) if report.status == CompileStatus::Cancelled => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Report, CliError> {
    let settings = cli.settings()?;
    tracing::debug!(?settings, "settings resolved");

    let compiler = FormulaCompiler::new(settings)?;
    let mut graph = Graph::default();
    let output = compiler.compile(&mut graph)?;

    let report = Report::new(&compiler.settings().formula, &output, &graph);
    println!("{}", report.render(cli.format)?);
    Ok(report)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "math_formula=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
