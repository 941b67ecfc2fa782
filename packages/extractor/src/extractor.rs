//! Batch extraction service that ties all components together.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::is_xml_file;
use crate::error::{ExtractorError, Result};
use crate::loader::{parse_document, read_document};
use crate::record::RecordBuilder;
use crate::rules::FieldSpecTable;
use crate::types::NewsRecord;

/// A document that could not be extracted, with the reason.
#[derive(Debug)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: ExtractorError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records in discovery order.
    pub records: Vec<NewsRecord>,
    pub failures: Vec<FailedDocument>,
    /// Documents processed per parent directory.
    pub per_directory: BTreeMap<PathBuf, usize>,
}

impl BatchReport {
    /// Number of documents attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Whether documents were attempted but none could be extracted.
    #[must_use]
    pub fn nothing_extracted(&self) -> bool {
        self.records.is_empty() && !self.failures.is_empty()
    }
}

/// Expand input paths into the list of documents to process.
///
/// Files are taken as given. Directories are walked recursively, sorted by
/// file name, keeping `*.xml` files. Unreadable entries are logged and skipped.
pub fn discover_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    for path in paths {
        if !path.is_dir() {
            documents.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_xml_file(entry.path()) => {
                    documents.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(root = %path.display(), error = %e, "Skipping unreadable entry");
                }
            }
        }
    }

    documents
}

/// Load one document from disk and build its record.
///
/// # Arguments
/// * `path` - The document to read
/// * `table` - The compiled field table
///
/// # Returns
/// The record, with the path as provenance. Fails with `Io` or
/// `MalformedDocument`; no partial record is produced.
pub fn extract_file(path: &Path, table: &FieldSpecTable) -> Result<NewsRecord> {
    let source_name = path.display().to_string();
    let xml = read_document(path)?;
    let document = parse_document(&xml, &source_name)?;
    Ok(RecordBuilder::new(table).build(&document, Some(&source_name)))
}

/// Extract every document under `paths`.
///
/// Each document is processed independently: a failure is recorded in the
/// report and the run continues. `on_progress` is called before each document.
pub fn extract_paths(
    paths: &[PathBuf],
    table: &FieldSpecTable,
    mut on_progress: impl FnMut(&Path),
) -> BatchReport {
    let mut report = BatchReport::default();

    for path in discover_documents(paths) {
        on_progress(&path);

        let directory = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        *report.per_directory.entry(directory).or_default() += 1;

        match extract_file(&path, table) {
            Ok(record) => report.records.push(record),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Failed to extract document (skipping)");
                report.failures.push(FailedDocument { path, error });
            }
        }
    }

    for (directory, count) in &report.per_directory {
        tracing::debug!(directory = %directory.display(), count, "Processed directory");
    }
    tracing::info!(
        records = report.records.len(),
        failures = report.failures.len(),
        "Extraction finished"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    const GOOD: &str = "<NewsML><NewsLines><HeadLine>Good</HeadLine></NewsLines></NewsML>";

    #[test]
    fn test_discover_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.xml"), GOOD).unwrap();
        fs::write(dir.path().join("a.XML"), GOOD).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("sub").join("c.xml"), GOOD).unwrap();

        let found = discover_documents(&[dir.path().to_path_buf()]);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.XML", "b.xml", "sub/c.xml"]);
    }

    #[test]
    fn test_explicit_file_kept_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("story.newsml");
        fs::write(&file, GOOD).unwrap();

        assert_eq!(discover_documents(&[file.clone()]), vec![file]);
    }

    #[test]
    fn test_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1.xml"), GOOD).unwrap();
        fs::write(dir.path().join("2.xml"), "<NewsML><HeadLine>Cut").unwrap();
        fs::write(dir.path().join("3.xml"), GOOD).unwrap();

        let table = FieldSpecTable::newsml().unwrap();
        let mut seen = Vec::new();
        let report = extract_paths(&[dir.path().to_path_buf()], &table, |p| {
            seen.push(p.to_path_buf());
        });

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("2.xml"));
        assert!(matches!(
            report.failures[0].error,
            ExtractorError::MalformedDocument { .. }
        ));
        assert_eq!(seen.len(), 3);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.per_directory.get(dir.path()), Some(&3));
        assert!(!report.nothing_extracted());
    }

    #[test]
    fn test_missing_file_is_a_document_failure() {
        let table = FieldSpecTable::newsml().unwrap();
        let report = extract_paths(&[PathBuf::from("/no/such/story.xml")], &table, |_| {});

        assert!(report.records.is_empty());
        assert!(report.failures[0].error.is_per_document());
        assert!(report.nothing_extracted());
    }

    #[test]
    fn test_extract_file_sets_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.xml");
        fs::write(&path, GOOD).unwrap();

        let table = FieldSpecTable::newsml().unwrap();
        let record = extract_file(&path, &table).unwrap();
        assert_eq!(record.source, Some(path.display().to_string()));
        assert_eq!(record.headline.as_text(), Some("Good"));
    }
}
