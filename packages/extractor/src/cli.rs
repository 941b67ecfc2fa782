//! Command-line interface for the extractor.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::OutputFormat;
use crate::error::{ExtractorError, Result};
use crate::extractor::extract_paths;
use crate::output::write_records;
use crate::rules::FieldSpecTable;

/// NewsML Extractor - Extract news fields from NewsML documents.
#[derive(Parser)]
#[command(name = "newsml-extractor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract records from NewsML files or directories.
    Extract {
        /// Files or directories to process (directories are searched for *.xml)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format: json, jsonl or yaml
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// YAML rules file replacing the built-in NewsML table
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Omit the source path from records
        #[arg(long)]
        no_source: bool,
    },

    /// Print the effective field table as YAML.
    Rules {
        /// YAML rules file to validate and print instead of the built-in table
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            paths,
            format,
            output,
            rules,
            no_source,
        } => extract_command(&paths, format, output.as_deref(), rules.as_deref(), no_source),
        Commands::Rules { rules } => rules_command(rules.as_deref()),
    }
}

/// Load the field table, from a rules file when one is given.
fn load_table(rules: Option<&Path>) -> Result<FieldSpecTable> {
    match rules {
        Some(path) => FieldSpecTable::from_file(path),
        None => FieldSpecTable::newsml(),
    }
}

/// Execute the extract command.
fn extract_command(
    paths: &[PathBuf],
    format: OutputFormat,
    output: Option<&Path>,
    rules: Option<&Path>,
    no_source: bool,
) -> Result<()> {
    // Compile rules before touching any document
    let table = load_table(rules)?;

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = extract_paths(paths, &table, |path| {
        pb.set_message(format!("Extracting {}", path.display()));
    });
    pb.finish_and_clear();

    for failure in &report.failures {
        eprintln!(
            "{} {}: {}",
            style("Failed").red().bold(),
            failure.path.display(),
            failure.error
        );
    }

    if report.nothing_extracted() {
        return Err(ExtractorError::NothingExtracted {
            failed: report.failures.len(),
        });
    }

    let records: Vec<_> = if no_source {
        report.records.into_iter().map(|r| r.without_source()).collect()
    } else {
        report.records
    };

    write_records(&records, format, output)?;

    eprintln!(
        "{} {} of {} documents",
        style("Extracted").green().bold(),
        style(records.len()).cyan(),
        records.len() + report.failures.len()
    );
    for (directory, count) in &report.per_directory {
        eprintln!(
            "{} {count} files in {}",
            style("Processed").dim(),
            directory.display()
        );
    }
    if let Some(path) = output {
        eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
    }

    Ok(())
}

/// Execute the rules command.
fn rules_command(rules: Option<&Path>) -> Result<()> {
    let table = load_table(rules)?;
    let yaml = table.to_yaml()?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(yaml.as_bytes())?;
    Ok(())
}
