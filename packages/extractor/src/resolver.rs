//! Field resolution: apply a field's ordered rules until one yields content.

use roxmltree::Node;

use crate::rules::FieldSpec;
use crate::types::FieldValue;

/// Outcome of resolving one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub value: FieldValue,

    /// Index of the rule that produced the value; `None` when absent.
    pub rule_index: Option<usize>,
}

impl Resolution {
    fn absent() -> Self {
        Self {
            value: FieldValue::Absent,
            rule_index: None,
        }
    }
}

/// Resolve one field against a document root.
///
/// Rules are tried in declared order and the first one producing non-empty
/// normalized content wins; later rules are never consulted. When no rule
/// succeeds the value is [`FieldValue::Absent`], which is not an error.
pub fn resolve_field(root: Node<'_, '_>, spec: &FieldSpec) -> Resolution {
    for (index, rule) in spec.rules.iter().enumerate() {
        if let Some(values) = rule.apply(root) {
            tracing::debug!(
                field = %spec.field,
                rule = rule.description(),
                index,
                "Field resolved"
            );
            return Resolution {
                value: FieldValue::from_values(spec.field.kind(), values),
                rule_index: Some(index),
            };
        }
    }

    tracing::debug!(field = %spec.field, "Field absent");
    Resolution::absent()
}
