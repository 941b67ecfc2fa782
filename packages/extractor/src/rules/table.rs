//! The compiled field table.

use std::fs;
use std::path::Path;

use super::config::create_newsml_table;
use super::rule::LookupRule;
use super::types::TableSpec;
use crate::error::{ExtractorError, Result};
use crate::types::Field;

/// A field together with its ordered lookup rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub rules: Vec<LookupRule>,
}

/// Compiled rules for all seven fields.
///
/// The table is immutable once compiled and can be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpecTable {
    specs: Vec<FieldSpec>,
    source: TableSpec,
}

impl FieldSpecTable {
    /// Compile a declarative table.
    ///
    /// Every field must be declared, even if with an empty rule list, so a
    /// typo in a rules file cannot silently drop a field.
    pub fn compile(spec: TableSpec) -> Result<Self> {
        for (prefix, uri) in &spec.namespaces {
            if prefix.is_empty() || prefix.contains(':') {
                return Err(ExtractorError::invalid_spec(
                    "namespaces",
                    prefix,
                    "namespace prefix must be a non-empty name without ':'",
                ));
            }
            if uri.trim().is_empty() {
                return Err(ExtractorError::invalid_spec(
                    "namespaces",
                    prefix,
                    "namespace URI is empty",
                ));
            }
        }

        let specs = Field::ALL
            .into_iter()
            .map(|field| -> Result<FieldSpec> {
                let rules = spec.fields.get(&field).ok_or_else(|| {
                    ExtractorError::invalid_spec(field.as_str(), "", "field has no rule list")
                })?;
                let rules = rules
                    .iter()
                    .map(|rule| LookupRule::compile(field, rule, &spec.namespaces))
                    .collect::<Result<Vec<_>>>()?;

                if rules.is_empty() {
                    tracing::debug!(field = %field, "Field has no rules and will always be absent");
                }
                Ok(FieldSpec { field, rules })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            specs,
            source: spec,
        })
    }

    /// Compile the built-in NewsML table.
    pub fn newsml() -> Result<Self> {
        Self::compile(create_newsml_table())
    }

    /// Compile a table from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let spec: TableSpec = serde_yaml_ng::from_str(yaml)?;
        Self::compile(spec)
    }

    /// Load and compile a rules file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)?;
        let spec: TableSpec =
            serde_yaml_ng::from_str(&yaml).map_err(|source| ExtractorError::RulesFile {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "Loaded rules file");
        Self::compile(spec)
    }

    /// Get the spec of a field.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.field == field)
    }

    /// Get the ordered rules of a field.
    #[must_use]
    pub fn rules(&self, field: Field) -> &[LookupRule] {
        self.get(field).map(|spec| spec.rules.as_slice()).unwrap_or_default()
    }

    /// Iterate over field specs in output order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs.iter()
    }

    /// Get the declarative form this table was compiled from.
    #[must_use]
    pub fn spec(&self) -> &TableSpec {
        &self.source
    }

    /// Render the table as a YAML rules file.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self.spec())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSpec;

    fn all_fields_empty() -> TableSpec {
        Field::ALL
            .into_iter()
            .fold(TableSpec::new(), |spec, field| spec.with_field(field, []))
    }

    #[test]
    fn test_newsml_table_compiles() {
        let table = FieldSpecTable::newsml().unwrap();
        for field in Field::ALL {
            assert!(!table.rules(field).is_empty(), "{field} has no rules");
        }
        let order: Vec<Field> = table.iter().map(|spec| spec.field).collect();
        assert_eq!(order, Field::ALL.to_vec());
    }

    #[test]
    fn test_missing_field_rejected() {
        let spec = TableSpec::new().with_field(Field::Headline, [RuleSpec::path(".//HeadLine")]);
        let err = FieldSpecTable::compile(spec).unwrap_err();
        assert!(matches!(
            err,
            ExtractorError::InvalidFieldSpec { ref field, .. } if field == "topic"
        ));
    }

    #[test]
    fn test_empty_rule_list_allowed() {
        let table = FieldSpecTable::compile(all_fields_empty()).unwrap();
        assert!(table.rules(Field::Location).is_empty());
    }

    #[test]
    fn test_bad_namespace_rejected() {
        let spec = all_fields_empty().with_namespace("nitf", "  ");
        assert!(FieldSpecTable::compile(spec).is_err());

        let spec = all_fields_empty().with_namespace("a:b", "urn:x");
        assert!(FieldSpecTable::compile(spec).is_err());
    }

    #[test]
    fn test_bound_prefix_accepted() {
        let spec = all_fields_empty()
            .with_namespace("nitf", "http://iptc.org/std/NITF/2006-10-18/")
            .with_field(Field::Headline, [RuleSpec::path(".//nitf:hl1").with_deep_text()]);
        let table = FieldSpecTable::compile(spec).unwrap();
        assert_eq!(table.rules(Field::Headline).len(), 1);
    }

    #[test]
    fn test_yaml_round_trip_of_builtin_table() {
        let table = FieldSpecTable::newsml().unwrap();
        let yaml = table.to_yaml().unwrap();
        let reloaded = FieldSpecTable::from_yaml_str(&yaml).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn test_spec_keeps_declarative_form() {
        let table = FieldSpecTable::newsml().unwrap();
        assert_eq!(table.spec(), &create_newsml_table());
        assert_eq!(
            table.rules(Field::Location)[0].description(),
            ".//Location { .//Property[@FormalName='City']/@Value + .//Property[@FormalName='Country']/@Value }"
        );
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        fs::write(&path, "fields: [not, a, map]\n").unwrap();

        let err = FieldSpecTable::from_file(&path).unwrap_err();
        match err {
            ExtractorError::RulesFile { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_table_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldSpecTable>();
    }
}
