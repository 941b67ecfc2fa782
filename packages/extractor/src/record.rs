//! Record building: resolve every field of one document into a [`NewsRecord`].

use roxmltree::{Document, Node};

use crate::error::Result;
use crate::loader::parse_document;
use crate::resolver::resolve_field;
use crate::rules::FieldSpecTable;
use crate::types::{FieldValue, NewsRecord};

/// Builds records from parsed documents using a shared field table.
#[derive(Debug, Clone, Copy)]
pub struct RecordBuilder<'t> {
    table: &'t FieldSpecTable,
}

impl<'t> RecordBuilder<'t> {
    #[must_use]
    pub fn new(table: &'t FieldSpecTable) -> Self {
        Self { table }
    }

    /// Build a record from a parsed document.
    ///
    /// This cannot fail: a field that no rule can fill is absent.
    #[must_use]
    pub fn build(&self, document: &Document<'_>, source: Option<&str>) -> NewsRecord {
        self.build_from_root(document.root_element(), source)
    }

    /// Build a record with `root` as the document root element.
    #[must_use]
    pub fn build_from_root(&self, root: Node<'_, '_>, source: Option<&str>) -> NewsRecord {
        let record = NewsRecord::from_fields(source.map(str::to_string), |field| {
            self.table
                .get(field)
                .map_or(FieldValue::Absent, |spec| resolve_field(root, spec).value)
        });

        tracing::debug!(
            source = source.unwrap_or("<unnamed>"),
            present = record.present_count(),
            "Built record"
        );
        record
    }
}

/// Parse `xml` and build its record in one step.
///
/// # Examples
/// ```
/// use newsml_extractor::{extract_str, FieldSpecTable};
///
/// let table = FieldSpecTable::newsml().unwrap();
/// let xml = "<NewsML><NewsItem><NewsComponent><NewsLines>\
///            <HeadLine>  Storm hits coast </HeadLine>\
///            </NewsLines></NewsComponent></NewsItem></NewsML>";
///
/// let record = extract_str(xml, "storm.xml", &table).unwrap();
/// assert_eq!(record.headline.as_text(), Some("Storm hits coast"));
/// assert!(record.date.is_absent());
/// ```
pub fn extract_str(xml: &str, source_name: &str, table: &FieldSpecTable) -> Result<NewsRecord> {
    let document = parse_document(xml, source_name)?;
    Ok(RecordBuilder::new(table).build(&document, Some(source_name)))
}
