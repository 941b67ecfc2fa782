//! Configuration constants and validation functions for the extractor.

use std::fmt;
use std::str::FromStr;

use crate::error::{ExtractorError, Result};

/// Maximum number of levels a descendant step searches below its context node.
///
/// NewsML 1.2 nests `NewsML/NewsItem/NewsComponent/...` and embedded NITF
/// bodies add a few more levels; real documents stay well under this bound.
pub const MAX_SEARCH_DEPTH: usize = 32;

/// File extension of documents picked up when walking a directory.
pub const XML_EXTENSION: &str = "xml";

/// Separator between paragraphs of the content field.
pub const DEFAULT_CONTENT_SEPARATOR: &str = "\n";

/// Separator between location parts (city, country).
pub const DEFAULT_LOCATION_SEPARATOR: &str = ", ";

/// Output timestamp format for the date field (UTC, numeric offset).
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Output serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON array holding every record.
    #[default]
    Json,
    /// One JSON object per line.
    JsonLines,
    /// A YAML sequence of records.
    Yaml,
}

impl OutputFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ExtractorError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Check whether a path names an XML document by extension (case-insensitive).
///
/// # Examples
/// ```
/// use std::path::Path;
/// use newsml_extractor::config::is_xml_file;
///
/// assert!(is_xml_file(Path::new("afp/2024/story.XML")));
/// assert!(!is_xml_file(Path::new("afp/readme.txt")));
/// ```
pub fn is_xml_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(XML_EXTENSION))
}
