//! Error types for the extractor.
//!
//! Per-document failures (`MalformedDocument`, `Io`) are isolated by the batch
//! driver. Rule table defects (`InvalidFieldSpec`, `RulesFile`) surface while
//! the table is compiled, before any document is read. A field that has no
//! value is not an error at all; see [`crate::types::FieldValue::Absent`].

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the extractor library.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// Input is not well-formed markup.
    #[error("Malformed document {source_name}: {source}")]
    MalformedDocument {
        source_name: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A lookup rule in the field table cannot be compiled.
    #[error("Invalid rule {rule:?} for field '{field}': {reason}")]
    InvalidFieldSpec {
        field: String,
        rule: String,
        reason: String,
    },

    /// Field name outside the fixed seven-field set.
    #[error("Unknown field '{0}'. Expected one of: headline, topic, tags, authors, date, content, location")]
    UnknownField(String),

    /// Output format not supported by any writer.
    #[error("Unsupported output format '{0}'. Expected json, jsonl or yaml")]
    UnsupportedFormat(String),

    /// Rules file could not be deserialized.
    #[error("Failed to read rules file {}: {source}", .path.display())]
    RulesFile {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A batch run in which every document failed.
    #[error("No records extracted: all {failed} documents failed")]
    NothingExtracted { failed: usize },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ExtractorError {
    /// Build an `InvalidFieldSpec` error.
    pub fn invalid_spec(
        field: impl Into<String>,
        rule: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldSpec {
            field: field.into(),
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error concerns a single input document rather than the run.
    #[must_use]
    pub fn is_per_document(&self) -> bool {
        matches!(self, Self::MalformedDocument { .. } | Self::Io(_))
    }
}

/// Result type alias for extractor operations.
pub type Result<T> = std::result::Result<T, ExtractorError>;
