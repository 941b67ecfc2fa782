//! Core data types for the extractor.
//!
//! These types describe the fixed seven-field news record and the value each
//! field resolves to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExtractorError;

/// The seven fields extracted from every news document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Headline,
    Topic,
    Tags,
    Authors,
    Date,
    Content,
    Location,
}

/// Whether a field holds one string or an ordered list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Single,
    List,
}

impl Field {
    /// All fields, in output order.
    pub const ALL: [Self; 7] = [
        Self::Headline,
        Self::Topic,
        Self::Tags,
        Self::Authors,
        Self::Date,
        Self::Content,
        Self::Location,
    ];

    /// Get the key used in output records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headline => "headline",
            Self::Topic => "topic",
            Self::Tags => "tags",
            Self::Authors => "authors",
            Self::Date => "date",
            Self::Content => "content",
            Self::Location => "location",
        }
    }

    /// Get the value shape of this field.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Tags | Self::Authors => FieldKind::List,
            _ => FieldKind::Single,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ExtractorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractorError::UnknownField(s.to_string()))
    }
}

/// The resolved value of one field.
///
/// `Absent` serializes as `null`, never as an empty string, so consumers can
/// tell "no data" apart from an empty field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Normalized text of a single-valued field.
    Text(String),
    /// Normalized entries of a multi-valued field, in document order.
    List(Vec<String>),
    /// No rule produced content.
    Absent,
}

impl FieldValue {
    /// Shape non-empty normalized values according to the field kind.
    ///
    /// An empty `values` vector yields `Absent`. Single-valued fields take
    /// the first value.
    #[must_use]
    pub fn from_values(kind: FieldKind, mut values: Vec<String>) -> Self {
        if values.is_empty() {
            return Self::Absent;
        }
        match kind {
            FieldKind::List => Self::List(values),
            FieldKind::Single => Self::Text(values.swap_remove(0)),
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Get the text of a single-valued field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the entries of a multi-valued field.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One extracted news record.
///
/// Every field is a struct member, so no key can ever be missing from the
/// serialized record. Fields serialize in the order of [`Field::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsRecord {
    /// Provenance: the file or identifier the record was built from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub headline: FieldValue,
    pub topic: FieldValue,
    pub tags: FieldValue,
    pub authors: FieldValue,
    pub date: FieldValue,
    pub content: FieldValue,
    pub location: FieldValue,
}

impl NewsRecord {
    /// Assemble a record by asking `resolve` for every field in output order.
    pub fn from_fields(source: Option<String>, mut resolve: impl FnMut(Field) -> FieldValue) -> Self {
        Self {
            source,
            headline: resolve(Field::Headline),
            topic: resolve(Field::Topic),
            tags: resolve(Field::Tags),
            authors: resolve(Field::Authors),
            date: resolve(Field::Date),
            content: resolve(Field::Content),
            location: resolve(Field::Location),
        }
    }

    /// Get the value of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> &FieldValue {
        match field {
            Field::Headline => &self.headline,
            Field::Topic => &self.topic,
            Field::Tags => &self.tags,
            Field::Authors => &self.authors,
            Field::Date => &self.date,
            Field::Content => &self.content,
            Field::Location => &self.location,
        }
    }

    /// Iterate over `(field, value)` pairs in output order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Number of fields that resolved to a value.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.fields().filter(|(_, value)| !value.is_absent()).count()
    }

    /// Drop the provenance, e.g. for output that must not leak local paths.
    #[must_use]
    pub fn without_source(mut self) -> Self {
        self.source = None;
        self
    }
}
