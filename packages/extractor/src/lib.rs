//! NewsML Extractor - Extract news fields from NewsML documents.
//!
//! This crate resolves seven fields (headline, topic, tags, authors, date,
//! content, location) from NewsML 1.2 style XML using a declarative table of
//! ordered lookup rules per field. The first rule that yields non-empty
//! normalized text wins; a field no rule can fill is explicitly absent.
//!
//! # Example
//!
//! ```
//! use newsml_extractor::{extract_str, FieldSpecTable, FieldValue};
//!
//! let table = FieldSpecTable::newsml().unwrap();
//! let xml = r#"<NewsML><NewsItem><NewsComponent>
//!     <NewsLines><HeadLine>Rain expected</HeadLine></NewsLines>
//!     <DescriptiveMetadata>
//!         <OfInterestTo FormalName="Weather--Europe"/>
//!     </DescriptiveMetadata>
//! </NewsComponent></NewsItem></NewsML>"#;
//!
//! let record = extract_str(xml, "rain.xml", &table).unwrap();
//! assert_eq!(record.headline.as_text(), Some("Rain expected"));
//! assert_eq!(
//!     record.tags,
//!     FieldValue::List(vec!["Weather".into(), "Europe".into()])
//! );
//! assert!(record.location.is_absent());
//! ```
//!
//! # Architecture
//!
//! - [`types`]: Fields, field values and the news record
//! - [`rules`]: Lookup path language and the compiled field table
//! - [`resolver`]: Per-field first-match resolution
//! - [`record`]: Record building from a parsed document
//! - [`loader`]: Reading, decoding and parsing documents
//! - [`text`]: Text normalization and timestamp canonicalization
//! - [`xml`]: XML utilities
//! - [`extractor`]: Batch extraction over files and directories
//! - [`output`]: JSON, JSON Lines and YAML writers
//! - [`config`]: Configuration constants
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod loader;
pub mod output;
pub mod record;
pub mod resolver;
pub mod rules;
pub mod text;
pub mod types;
pub mod xml;

// Re-export main functions
pub use extractor::{extract_file, extract_paths, BatchReport, FailedDocument};
pub use record::{extract_str, RecordBuilder};
pub use resolver::{resolve_field, Resolution};

// Re-export commonly used items
pub use config::OutputFormat;
pub use error::{ExtractorError, Result};
pub use rules::{FieldSpec, FieldSpecTable, RuleSpec, TableSpec};
pub use types::{Field, FieldKind, FieldValue, NewsRecord};
