//! Lookup path expressions.
//!
//! A small ElementTree-style path language:
//!
//! ```text
//! .//NewsLines/HeadLine                        descendant NewsLines, child HeadLine
//! .//ContentItem//DataContent//p               descendant steps at every level
//! .//Location//Property[@FormalName='City']/@Value
//! NewsItem/nitf:body                           child steps, namespaced last step
//! ```
//!
//! Paths are parsed once when the rule table is compiled and evaluated
//! against the root element of every document.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::Node;
use thiserror::Error;

use crate::config::MAX_SEARCH_DEPTH;
use crate::xml::{element_children, matches_name};

/// `prefix:name[@attr='value']`, prefix and predicate optional.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:([A-Za-z_][\w.-]*):)?([A-Za-z_][\w.-]*)(?:\[@([A-Za-z_][\w.-]*)\s*=\s*(?:'([^']*)'|"([^"]*)")\])?$"#,
    )
    .expect("valid regex")
});

/// Attribute name after a final `@`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ATTRIBUTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][\w.-]*)$").expect("valid regex"));

/// A path expression that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PathSyntaxError(String);

/// How a step relates to its context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Direct element children.
    Child,
    /// Descendant elements, at most `MAX_SEARCH_DEPTH` levels down.
    Descendant,
}

/// `[@name='value']` filter on a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePredicate {
    pub name: String,
    pub value: String,
}

/// One element step of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,

    /// Local tag name.
    pub name: String,

    /// Namespace URI the element must be in; `None` matches any namespace.
    pub namespace: Option<String>,

    pub predicate: Option<AttributePredicate>,
}

impl Step {
    fn matches(&self, node: Node<'_, '_>) -> bool {
        matches_name(node, &self.name, self.namespace.as_deref())
            && self
                .predicate
                .as_ref()
                .map_or(true, |p| node.attribute(p.name.as_str()) == Some(p.value.as_str()))
    }

    fn collect_matches<'a, 'input>(&self, node: Node<'a, 'input>, out: &mut Vec<Node<'a, 'input>>) {
        match self.axis {
            Axis::Child => out.extend(element_children(node).filter(|child| self.matches(*child))),
            Axis::Descendant => self.collect_descendants(node, 0, out),
        }
    }

    fn collect_descendants<'a, 'input>(
        &self,
        node: Node<'a, 'input>,
        depth: usize,
        out: &mut Vec<Node<'a, 'input>>,
    ) {
        if depth >= MAX_SEARCH_DEPTH {
            return;
        }
        for child in element_children(node) {
            if self.matches(child) {
                out.push(child);
            }
            self.collect_descendants(child, depth + 1, out);
        }
    }
}

/// A compiled lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPath {
    expression: String,
    steps: Vec<Step>,
    attribute: Option<String>,
}

impl LookupPath {
    /// Parse a path expression.
    ///
    /// `namespaces` maps prefixes to namespace URIs; a prefixed step whose
    /// prefix is not bound is rejected.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use newsml_extractor::rules::LookupPath;
    ///
    /// let path = LookupPath::parse(".//Provider/Party/@FormalName", &BTreeMap::new()).unwrap();
    /// assert_eq!(path.steps().len(), 2);
    /// assert_eq!(path.attribute(), Some("FormalName"));
    ///
    /// assert!(LookupPath::parse(".//nitf:body", &BTreeMap::new()).is_err());
    /// ```
    pub fn parse(
        expression: &str,
        namespaces: &BTreeMap<String, String>,
    ) -> Result<Self, PathSyntaxError> {
        let trimmed = expression.trim();
        let (first_axis, rest) = if let Some(rest) = trimmed.strip_prefix(".//") {
            (Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix("//") {
            (Axis::Descendant, rest)
        } else if let Some(rest) = trimmed.strip_prefix("./") {
            (Axis::Child, rest)
        } else {
            (Axis::Child, trimmed)
        };

        if rest.is_empty() {
            return Err(PathSyntaxError("path has no element step".to_string()));
        }

        let segments = split_segments(rest)?;
        let last_index = segments.len() - 1;
        let mut steps = Vec::new();
        let mut attribute = None;
        let mut axis = first_axis;
        let mut pending_descendant = false;

        for (index, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                if pending_descendant || axis == Axis::Descendant || index == last_index {
                    return Err(PathSyntaxError("empty step".to_string()));
                }
                axis = Axis::Descendant;
                pending_descendant = true;
                continue;
            }
            pending_descendant = false;

            if segment.starts_with('@') {
                if index != last_index {
                    return Err(PathSyntaxError(format!(
                        "attribute selector '{segment}' must be the last segment"
                    )));
                }
                if axis == Axis::Descendant {
                    return Err(PathSyntaxError(format!(
                        "attribute selector '{segment}' cannot follow '//'"
                    )));
                }
                let caps = ATTRIBUTE_PATTERN.captures(segment).ok_or_else(|| {
                    PathSyntaxError(format!("invalid attribute selector '{segment}'"))
                })?;
                attribute = caps.get(1).map(|m| m.as_str().to_string());
                continue;
            }

            steps.push(parse_step(segment, axis, namespaces)?);
            axis = Axis::Child;
        }

        if steps.is_empty() {
            return Err(PathSyntaxError("path has no element step".to_string()));
        }

        Ok(Self {
            expression: trimmed.to_string(),
            steps,
            attribute,
        })
    }

    /// Get the source expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the attribute selected by a final `@name`, if any.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    /// Evaluate the path from `root`, returning matches in document order.
    pub fn find_all<'a, 'input>(&self, root: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
        let mut context = vec![root];

        for step in &self.steps {
            let mut next = Vec::new();
            for node in &context {
                step.collect_matches(*node, &mut next);
            }
            // Nested descendant searches can reach the same node twice
            next.sort_by_key(|node| node.id().get_usize());
            next.dedup_by_key(|node| node.id().get_usize());

            if next.is_empty() {
                return next;
            }
            context = next;
        }

        context
    }
}

/// Split on `/` outside of `[...]` predicates and quotes.
fn split_segments(path: &str) -> Result<Vec<&str>, PathSyntaxError> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for (pos, c) in path.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') if in_brackets => quote = Some(c),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, '/') if !in_brackets => {
                segments.push(&path[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }

    if in_brackets || quote.is_some() {
        return Err(PathSyntaxError("unterminated predicate".to_string()));
    }
    segments.push(&path[start..]);
    Ok(segments)
}

fn parse_step(
    segment: &str,
    axis: Axis,
    namespaces: &BTreeMap<String, String>,
) -> Result<Step, PathSyntaxError> {
    let caps = STEP_PATTERN
        .captures(segment)
        .ok_or_else(|| PathSyntaxError(format!("invalid step '{segment}'")))?;

    let namespace = match caps.get(1) {
        Some(prefix) => Some(
            namespaces
                .get(prefix.as_str())
                .cloned()
                .ok_or_else(|| {
                    PathSyntaxError(format!("unbound namespace prefix '{}'", prefix.as_str()))
                })?,
        ),
        None => None,
    };

    let name = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| PathSyntaxError(format!("invalid step '{segment}'")))?;

    let predicate = caps.get(3).map(|attr| AttributePredicate {
        name: attr.as_str().to_string(),
        value: caps
            .get(4)
            .or_else(|| caps.get(5))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    });

    Ok(Step {
        axis,
        name,
        namespace,
        predicate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse(expression: &str) -> LookupPath {
        LookupPath::parse(expression, &BTreeMap::new()).unwrap()
    }

    fn texts(path: &LookupPath, xml: &str) -> Vec<String> {
        let doc = Document::parse(xml).unwrap();
        path.find_all(doc.root_element())
            .into_iter()
            .map(|n| n.text().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_parse_descendant_then_child() {
        let path = parse("  .//NewsLines/HeadLine ");
        assert_eq!(path.expression(), ".//NewsLines/HeadLine");
        assert_eq!(path.steps().len(), 2);
        assert_eq!(path.steps()[0].axis, Axis::Descendant);
        assert_eq!(path.steps()[0].name, "NewsLines");
        assert_eq!(path.steps()[1].axis, Axis::Child);
        assert_eq!(path.attribute(), None);
    }

    #[test]
    fn test_parse_inner_descendant_and_predicate() {
        let path = parse(".//Location//Property[@FormalName='City']/@Value");
        assert_eq!(path.steps()[1].axis, Axis::Descendant);
        assert_eq!(
            path.steps()[1].predicate,
            Some(AttributePredicate {
                name: "FormalName".into(),
                value: "City".into()
            })
        );
        assert_eq!(path.attribute(), Some("Value"));
    }

    #[test]
    fn test_parse_predicate_value_with_slash() {
        let path = parse(r#"Property[@Value="a/b"]"#);
        assert_eq!(path.steps().len(), 1);
        assert_eq!(path.steps()[0].predicate.as_ref().unwrap().value, "a/b");
    }

    #[test]
    fn test_parse_namespace_prefix() {
        let mut namespaces = BTreeMap::new();
        namespaces.insert("nitf".to_string(), "urn:nitf".to_string());
        let path = LookupPath::parse(".//nitf:body.content", &namespaces).unwrap();
        assert_eq!(path.steps()[0].namespace.as_deref(), Some("urn:nitf"));
    }

    #[test]
    fn test_parse_errors() {
        let empty = BTreeMap::new();
        for bad in [
            "",
            ".//",
            "a/",
            "a///b",
            "@Value",
            "a/@Value/b",
            "a//@Value",
            "a/@",
            "a[@x='1'",
            "a b",
            "x:a",
        ] {
            assert!(LookupPath::parse(bad, &empty).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn test_child_axis_only_direct_children() {
        let xml = "<root><a><b>deep</b></a><b>direct</b></root>";
        assert_eq!(texts(&parse("b"), xml), vec!["direct"]);
        assert_eq!(texts(&parse("./b"), xml), vec!["direct"]);
        assert_eq!(texts(&parse(".//b"), xml), vec!["deep", "direct"]);
    }

    #[test]
    fn test_root_itself_is_not_matched() {
        let xml = "<p><p>inner</p></p>";
        assert_eq!(texts(&parse(".//p"), xml), vec!["inner"]);
    }

    #[test]
    fn test_nested_descendants_deduplicated_in_document_order() {
        let xml = "<root><a><a><p>1</p></a><p>2</p></a><p>3</p></root>";
        assert_eq!(texts(&parse(".//a//p"), xml), vec!["1", "2"]);
    }

    #[test]
    fn test_matches_from_several_contexts_in_document_order() {
        let xml = "<root><s><a><p>1</p></a></s><a><p>2</p><s><a><p>3</p></a></s></a></root>";
        assert_eq!(texts(&parse(".//a/p"), xml), vec!["1", "2", "3"]);
        assert_eq!(texts(&parse(".//s//p"), xml), vec!["1", "3"]);
    }

    #[test]
    fn test_predicate_filters() {
        let xml = r#"<root>
            <Property FormalName="Country" Value="FRA"/>
            <Property FormalName="City" Value="Paris"/>
        </root>"#;
        let path = parse(".//Property[@FormalName='City']");
        let doc = Document::parse(xml).unwrap();
        let nodes = path.find_all(doc.root_element());
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].attribute("Value"), Some("Paris"));
    }

    #[test]
    fn test_namespace_step_matches_only_bound_uri() {
        let mut namespaces = BTreeMap::new();
        namespaces.insert("m".to_string(), "urn:modern".to_string());
        let path = LookupPath::parse(".//m:title", &namespaces).unwrap();

        let xml = r#"<root xmlns:l="urn:legacy" xmlns:m="urn:modern">
            <l:title>legacy</l:title><m:title>modern</m:title></root>"#;
        assert_eq!(texts(&path, xml), vec!["modern"]);
        assert_eq!(texts(&parse(".//title"), xml), vec!["legacy", "modern"]);
    }

    #[test]
    fn test_descendant_search_depth_bound() {
        let mut xml = String::from("<root>");
        for _ in 0..MAX_SEARCH_DEPTH {
            xml.push_str("<d>");
        }
        xml.push_str("<target>too deep</target>");
        for _ in 0..MAX_SEARCH_DEPTH {
            xml.push_str("</d>");
        }
        xml.push_str("<target>shallow</target></root>");

        assert_eq!(texts(&parse(".//target"), &xml), vec!["shallow"]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let xml = "<root><a/></root>";
        assert!(texts(&parse(".//missing/a"), xml).is_empty());
    }
}
