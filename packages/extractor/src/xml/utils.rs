//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use newsml_extractor::xml::get_tag_name;
///
/// let xml = r#"<n:NewsML xmlns:n="urn:newsml"><n:NewsItem/></n:NewsML>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "NewsML");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Check if a node is an element with the given local name (any namespace).
pub fn has_local_name(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && get_tag_name(node) == name
}

/// Check if a node is an element with the given local name and namespace.
///
/// `namespace` of `None` matches any namespace.
pub fn matches_name(node: Node<'_, '_>, name: &str, namespace: Option<&str>) -> bool {
    if !has_local_name(node, name) {
        return false;
    }
    match namespace {
        Some(uri) => node.tag_name().namespace() == Some(uri),
        None => true,
    }
}

/// Get all element children of a node, in document order.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Get the direct text content of a node, untrimmed.
///
/// Only the first text child counts; text after nested elements is ignored.
pub fn direct_text<'a>(node: Node<'a, '_>) -> &'a str {
    node.text().unwrap_or_default()
}

/// Get the text of a node including all descendant text and tails.
///
/// Whitespace is preserved; callers normalize.
pub fn deep_text(node: Node<'_, '_>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: Node<'_, '_>, out: &mut String) {
    if let Some(t) = node.text() {
        out.push_str(t);
    }

    for child in node.children() {
        if child.is_element() {
            collect_text(child, out);
            if let Some(tail) = child.tail() {
                out.push_str(tail);
            }
        }
    }
}
