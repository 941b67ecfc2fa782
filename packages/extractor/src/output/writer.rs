//! Record writers for JSON, JSON Lines and YAML.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::types::NewsRecord;

/// Render records in the given format.
///
/// Every record carries all seven field keys; absent values render as `null`.
pub fn render(records: &[NewsRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(records)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::JsonLines => {
            let mut out = String::new();
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(records)?;
            // Add document start marker and clean up trailing whitespace
            let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
            Ok(format!("---\n{}\n", lines.join("\n")))
        }
    }
}

/// Write records to `output`, or to stdout when `None`.
///
/// File output uses the atomic write pattern: write a temp file next to the
/// target, sync it to disk, then rename it over the target.
pub fn write_records(
    records: &[NewsRecord],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let content = render(records, format)?;

    let Some(output) = output else {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("records.{format}"));
    let temp_file = output.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output.exists() {
        fs::remove_file(output)?;
    }

    fs::rename(&temp_file, output)?;
    tracing::info!(path = %output.display(), records = records.len(), "Wrote records");
    Ok(())
}
