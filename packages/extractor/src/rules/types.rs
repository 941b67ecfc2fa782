//! Declarative rule descriptions.
//!
//! These are the serializable forms of the field table, written in code for
//! the built-in NewsML table or loaded from a YAML rules file. They are
//! compiled into [`super::LookupRule`]s before use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Field;

/// How the nodes matched by a path are turned into values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collect {
    /// Only the first matching node.
    #[default]
    First,
    /// Every matching node, in document order (multi-valued fields).
    All,
    /// Every matching node joined with the rule's separator (single-valued fields).
    Join,
}

impl Collect {
    fn is_first(&self) -> bool {
        *self == Self::First
    }
}

/// Declarative description of one lookup rule.
///
/// Exactly one of `path` and `parts` must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// Path expression, e.g. `.//NewsLines/HeadLine`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Path expressions of a composite rule, each resolved to its first match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<String>,

    /// Element a composite rule reads all of its parts from; the first match
    /// is used, so parts never mix values from sibling elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Separator for `collect: join` and composite rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Take the text of the whole subtree instead of the direct text.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deep_text: bool,

    #[serde(default, skip_serializing_if = "Collect::is_first")]
    pub collect: Collect,

    /// Split every value on this separator (multi-valued fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_on: Option<String>,

    /// Canonicalize values as UTC timestamps.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub timestamp: bool,
}

impl RuleSpec {
    /// Create a rule reading the first node matched by `path`.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Create a composite rule joining the first match of every part.
    #[must_use]
    pub fn composite(
        parts: impl IntoIterator<Item = impl Into<String>>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
            separator: Some(separator.into()),
            ..Self::default()
        }
    }

    /// Resolve the parts of a composite rule inside the first `context` match.
    #[must_use]
    pub fn within(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Read the text of the whole subtree.
    #[must_use]
    pub fn with_deep_text(mut self) -> Self {
        self.deep_text = true;
        self
    }

    /// Collect every match as a list entry.
    #[must_use]
    pub fn collect_all(mut self) -> Self {
        self.collect = Collect::All;
        self
    }

    /// Collect every match and join them with `separator`.
    #[must_use]
    pub fn joined(mut self, separator: impl Into<String>) -> Self {
        self.collect = Collect::Join;
        self.separator = Some(separator.into());
        self
    }

    /// Split each value on `separator`.
    #[must_use]
    pub fn with_split_on(mut self, separator: impl Into<String>) -> Self {
        self.split_on = Some(separator.into());
        self
    }

    /// Canonicalize values as timestamps.
    #[must_use]
    pub fn as_timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }

    /// Human-readable form used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match (&self.path, &self.context) {
            (Some(path), _) => path.clone(),
            (None, Some(context)) => format!("{context} {{ {} }}", self.parts.join(" + ")),
            (None, None) => self.parts.join(" + "),
        }
    }
}

/// Declarative field table: namespace bindings plus ordered rules per field.
///
/// This is also the format of a rules file:
///
/// ```yaml
/// namespaces:
///   nitf: http://iptc.org/std/NITF/2006-10-18/
/// fields:
///   headline:
///     - path: .//NewsLines/HeadLine
///     - path: .//nitf:hl1
///       deep_text: true
///   tags:
///     - path: .//OfInterestTo/@FormalName
///       collect: all
///       split_on: '--'
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    /// Prefix to namespace URI bindings usable in path expressions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub namespaces: BTreeMap<String, String>,

    /// Ordered rules per field; earlier rules take precedence.
    pub fields: BTreeMap<Field, Vec<RuleSpec>>,
}

impl TableSpec {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a namespace prefix.
    #[must_use]
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Declare the ordered rules of a field, replacing earlier ones.
    #[must_use]
    pub fn with_field(mut self, field: Field, rules: impl IntoIterator<Item = RuleSpec>) -> Self {
        self.fields.insert(field, rules.into_iter().collect());
        self
    }
}
