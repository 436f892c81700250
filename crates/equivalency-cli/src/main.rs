use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use equivalency_core::{Config, EquivalencyOptions, EquivalencyReport, MismatchCode, ObjectGraph, RowMatchMode};
use equivalency_engine::Equivalency;

const DEFAULT_CONFIG: &str = "equivalency.toml";

/// Equivalency - structural comparison of object graphs and tabular data
#[derive(Parser)]
#[command(name = "equivalency")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: equivalency.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a subject graph against an expectation graph
    Compare(CompareArgs),

    /// Write a config file with the default options
    InitConfig {
        /// Where to write the config
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct CompareArgs {
    /// JSON file holding the subject graph
    subject: PathBuf,

    /// JSON file holding the expectation graph
    expectation: PathBuf,

    /// Output file for report.json
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How rows of paired tables are matched
    #[arg(long, value_enum)]
    row_match_mode: Option<RowMatching>,

    /// Table to leave out (repeatable)
    #[arg(long = "exclude-table", value_name = "TABLE")]
    exclude_tables: Vec<String>,

    /// Column to leave out, as TABLE.COLUMN or COLUMN for every table (repeatable)
    #[arg(long = "exclude-column", value_name = "COLUMN")]
    exclude_columns: Vec<String>,

    /// Member path to leave out, e.g. Customer.Name (repeatable)
    #[arg(long = "exclude-member", value_name = "PATH")]
    exclude_members: Vec<String>,

    /// Skip columns present on only one side
    #[arg(long)]
    ignore_unmatched_columns: bool,

    /// Tolerate differing runtime types
    #[arg(long)]
    allow_mismatched_types: bool,

    /// Skip original values of rows modified on both sides
    #[arg(long)]
    exclude_original_data: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RowMatching {
    Index,
    PrimaryKey,
}

impl From<RowMatching> for RowMatchMode {
    fn from(mode: RowMatching) -> Self {
        match mode {
            RowMatching::Index => RowMatchMode::Index,
            RowMatching::PrimaryKey => RowMatchMode::PrimaryKey,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Compare(args) => {
            let config = load_config(cli.config.as_deref(), cli.verbose)?;
            compare_command(&config, &args, cli.verbose)
        }
        Commands::InitConfig { output, force } => init_config_command(&output, force),
    }
}

/// Load the config named on the command line, or equivalency.toml if present
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()));
    }

    let default_path = Path::new(DEFAULT_CONFIG);
    if default_path.exists() {
        return Config::from_file(default_path).with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG));
    }

    if verbose {
        eprintln!("{}", "No config file found, using defaults".yellow());
    }
    Ok(Config::default())
}

/// Compare command - report every mismatch between two graphs
fn compare_command(config: &Config, args: &CompareArgs, verbose: bool) -> Result<()> {
    let report = run_compare(config, args, verbose)?;

    if let Some(output) = &args.output {
        report
            .save_to_file(output)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), output.display());
        }
    }

    print_report_summary(&report, &args.subject, &args.expectation);

    if !report.is_equivalent() {
        std::process::exit(1);
    }

    Ok(())
}

/// Load both graphs, build the options and run the comparison
fn run_compare(config: &Config, args: &CompareArgs, verbose: bool) -> Result<EquivalencyReport> {
    let subject = load_graph(&args.subject)?;
    let expectation = load_graph(&args.expectation)?;

    let defaults = config.options().context("Invalid [defaults] in config")?;
    let subject_name = args.subject.display().to_string();
    let equivalency = Equivalency::new(&defaults)
        .try_configure(|options| apply_overrides(options, args))
        .context("Invalid comparison options")?
        .with_subject_description(move || subject_name.clone());

    if verbose {
        eprintln!(
            "{} {} {} {}",
            "Comparing".cyan(),
            args.subject.display(),
            "against".cyan(),
            args.expectation.display()
        );
        eprintln!("{} {}", "Row matching:".cyan(), equivalency.options().row_match_mode());
    }

    let comparison = equivalency.compare(&subject, &expectation);
    tracing::info!(
        mismatches = comparison.mismatches.len(),
        nodes_visited = comparison.nodes_visited,
        "comparison complete"
    );

    Ok(comparison.into_report().with_metadata(serde_json::json!({
        "subject": args.subject.display().to_string(),
        "expectation": args.expectation.display().to_string(),
    })))
}

fn load_graph(path: &Path) -> Result<ObjectGraph> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse object graph in {}", path.display()))
}

/// Layer the command-line flags over the configured defaults
fn apply_overrides(
    options: &mut EquivalencyOptions,
    args: &CompareArgs,
) -> std::result::Result<(), equivalency_core::OptionsError> {
    if let Some(mode) = args.row_match_mode {
        options.using_row_match_mode(mode.into());
    }
    if args.ignore_unmatched_columns {
        options.ignoring_unmatched_columns();
    }
    if args.allow_mismatched_types {
        options.allowing_mismatched_types();
    }
    if args.exclude_original_data {
        options.excluding_original_data();
    }

    options.excluding_tables(args.exclude_tables.iter().cloned());
    for column in &args.exclude_columns {
        match column.split_once('.') {
            Some((table, column)) => options.excluding_column(table, column),
            None => options.excluding_column_in_all_tables(column.clone()),
        };
    }
    for member in &args.exclude_members {
        options.excluding(member)?;
    }

    Ok(())
}

/// Init config command - write the default options to disk
fn init_config_command(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Pass --force to overwrite it.",
            output.display()
        ));
    }

    Config::default()
        .save_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("{} {}", "Config written to:".green(), output.display());

    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &EquivalencyReport, subject: &Path, expectation: &Path) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Equivalency Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Subject:     {}", subject.display());
    println!("Expectation: {}", expectation.display());
    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Nodes compared: {}", report.summary.nodes_visited);
    if report.summary.total > 0 {
        println!("  Mismatches:     {}", report.summary.total.to_string().red().bold());
    } else {
        println!("  Mismatches:     {}", report.summary.total.to_string().green());
    }
    for (code, count) in &report.summary.by_code {
        println!("    {}: {}", code, count);
    }
    println!();

    if report.mismatches.is_empty() {
        println!("{}", "✓ Subject is equivalent to the expectation".green().bold());
    } else {
        println!("{}", "Mismatches:".bold());
        for mismatch in &report.mismatches {
            let code = match mismatch.code {
                MismatchCode::ValueMismatch => mismatch.code.as_str().red().bold(),
                MismatchCode::MissingElement
                | MismatchCode::UnexpectedElement
                | MismatchCode::MissingMember
                | MismatchCode::UnmatchedRow => mismatch.code.as_str().yellow().bold(),
                _ => mismatch.code.as_str().magenta().bold(),
            };

            println!("  [{}] {}", code, mismatch.path);
            if let Some(expected) = &mismatch.expected {
                println!("    Expected: {}", expected);
            }
            if let Some(actual) = &mismatch.actual {
                println!("    Actual:   {}", actual);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
