//! Compiled lookup rules.

use std::collections::{BTreeMap, HashSet};

use roxmltree::Node;

use super::path::LookupPath;
use super::types::{Collect, RuleSpec};
use crate::config::{DEFAULT_CONTENT_SEPARATOR, DEFAULT_LOCATION_SEPARATOR};
use crate::error::{ExtractorError, Result};
use crate::text::{canonical_timestamp, normalize_text, split_normalized};
use crate::types::{Field, FieldKind};
use crate::xml::{deep_text, direct_text};

/// What a rule looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleTarget {
    /// One path; matches are collected per the rule's [`Collect`] mode.
    Path(LookupPath),
    /// Several paths, first match of each, joined with `separator`.
    /// With a `context`, parts are resolved inside its first match only.
    Composite {
        context: Option<LookupPath>,
        parts: Vec<LookupPath>,
        separator: String,
    },
}

/// A validated lookup rule, ready to run against documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRule {
    description: String,
    target: RuleTarget,
    deep_text: bool,
    collect: Collect,
    separator: String,
    split_on: Option<String>,
    timestamp: bool,
}

impl LookupRule {
    /// Compile a declarative rule for `field`.
    ///
    /// Every combination that cannot work for the field is rejected here,
    /// so resolution never has to deal with a bad rule.
    pub fn compile(
        field: Field,
        spec: &RuleSpec,
        namespaces: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let description = spec.describe();
        let invalid = |reason: &str| ExtractorError::invalid_spec(field.as_str(), &description, reason);
        let parse = |expression: &str| {
            LookupPath::parse(expression, namespaces).map_err(|e| {
                ExtractorError::invalid_spec(field.as_str(), expression, e.to_string())
            })
        };
        let kind = field.kind();

        let target = match (&spec.path, spec.parts.is_empty()) {
            (Some(_), false) => return Err(invalid("rule sets both 'path' and 'parts'")),
            (None, true) => return Err(invalid("rule sets neither 'path' nor 'parts'")),
            (Some(path), true) => {
                if spec.context.is_some() {
                    return Err(invalid("'context' applies to composite rules only"));
                }
                RuleTarget::Path(parse(path.as_str())?)
            }
            (None, false) => {
                if kind == FieldKind::List {
                    return Err(invalid("composite rules produce one value; field is multi-valued"));
                }
                if spec.collect != Collect::First {
                    return Err(invalid("composite rules always take the first match of each part"));
                }
                let parts = spec
                    .parts
                    .iter()
                    .map(|part| parse(part.as_str()))
                    .collect::<Result<Vec<_>>>()?;
                let context = spec
                    .context
                    .as_deref()
                    .map(|context| parse(context))
                    .transpose()?;
                if context.as_ref().is_some_and(|c| c.attribute().is_some()) {
                    return Err(invalid("'context' must select an element, not an attribute"));
                }
                RuleTarget::Composite {
                    context,
                    parts,
                    separator: spec
                        .separator
                        .clone()
                        .unwrap_or_else(|| DEFAULT_LOCATION_SEPARATOR.to_string()),
                }
            }
        };

        match (spec.collect, kind) {
            (Collect::All, FieldKind::Single) => {
                return Err(invalid("'collect: all' needs a multi-valued field; use 'join'"));
            }
            (Collect::Join, FieldKind::List) => {
                return Err(invalid("'collect: join' needs a single-valued field; use 'all'"));
            }
            _ => {}
        }

        if spec.split_on.is_some() && kind == FieldKind::Single {
            return Err(invalid("'split_on' needs a multi-valued field"));
        }
        if spec.split_on.as_deref() == Some("") {
            return Err(invalid("'split_on' separator is empty"));
        }

        let selects_attribute = match &target {
            RuleTarget::Path(path) => path.attribute().is_some(),
            RuleTarget::Composite { parts, .. } => parts.iter().all(|p| p.attribute().is_some()),
        };
        if spec.deep_text && selects_attribute {
            return Err(invalid("'deep_text' has no effect on an attribute selector"));
        }

        Ok(Self {
            description,
            target,
            deep_text: spec.deep_text,
            collect: spec.collect,
            separator: spec
                .separator
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTENT_SEPARATOR.to_string()),
            split_on: spec.split_on.clone(),
            timestamp: spec.timestamp,
        })
    }

    /// Get the rule in its declared textual form.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the rule against a document root.
    ///
    /// Returns the normalized, non-empty values, or `None` when the rule
    /// found nothing usable and the next rule should be tried.
    pub fn apply(&self, root: Node<'_, '_>) -> Option<Vec<String>> {
        let values = match &self.target {
            RuleTarget::Path(path) => {
                let mut nodes = path.find_all(root);
                match self.collect {
                    Collect::First => nodes.truncate(1),
                    // Subtree text of an outer match already covers nested ones
                    Collect::All | Collect::Join if self.deep_text => nodes = outermost(nodes),
                    Collect::All | Collect::Join => {}
                }
                let matched = &nodes[..];
                let values: Vec<String> = matched
                    .iter()
                    .flat_map(|node| self.normalize(&self.extract(path, *node)))
                    .collect();

                if self.collect == Collect::Join && !values.is_empty() {
                    vec![values.join(&self.separator)]
                } else {
                    values
                }
            }
            RuleTarget::Composite {
                context,
                parts,
                separator,
            } => {
                let scope = match context {
                    Some(context) => context.find_all(root).into_iter().next()?,
                    None => root,
                };
                let pieces: Vec<String> = parts
                    .iter()
                    .filter_map(|part| {
                        let node = part.find_all(scope).into_iter().next()?;
                        normalize_text(&self.extract(part, node))
                    })
                    .collect();

                if pieces.is_empty() {
                    Vec::new()
                } else {
                    self.finish(pieces.join(separator)).into_iter().collect()
                }
            }
        };

        (!values.is_empty()).then_some(values)
    }

    fn extract(&self, path: &LookupPath, node: Node<'_, '_>) -> String {
        match path.attribute() {
            Some(name) => node.attribute(name).unwrap_or_default().to_string(),
            None if self.deep_text => deep_text(node),
            None => direct_text(node).to_string(),
        }
    }

    fn normalize(&self, raw: &str) -> Vec<String> {
        let pieces = match &self.split_on {
            Some(separator) => split_normalized(raw, separator),
            None => normalize_text(raw).into_iter().collect(),
        };
        pieces.into_iter().filter_map(|piece| self.finish(piece)).collect()
    }

    fn finish(&self, value: String) -> Option<String> {
        if !self.timestamp {
            return Some(value);
        }
        match canonical_timestamp(&value) {
            Some(canonical) => Some(canonical),
            None => {
                tracing::debug!(rule = %self.description, value = %value, "Unrecognized timestamp kept as text");
                Some(value)
            }
        }
    }
}

/// Drop matches nested inside another match, keeping document order.
fn outermost<'a, 'input>(nodes: Vec<Node<'a, 'input>>) -> Vec<Node<'a, 'input>> {
    let matched: HashSet<usize> = nodes.iter().map(|n| n.id().get_usize()).collect();
    nodes
        .into_iter()
        .filter(|node| {
            !node
                .ancestors()
                .skip(1)
                .any(|ancestor| matched.contains(&ancestor.id().get_usize()))
        })
        .collect()
}
