//! Field table configuration for AFP-style NewsML 1.2 documents.

use super::types::{RuleSpec, TableSpec};
use crate::config::{DEFAULT_CONTENT_SEPARATOR, DEFAULT_LOCATION_SEPARATOR};
use crate::types::Field;

/// Create the field table for NewsML 1.2 documents.
///
/// Rules are listed most specific first. The NewsML envelope is preferred
/// and embedded NITF markup (`body.content`, `dateline`, `story.date`) is
/// the fallback.
#[must_use]
pub fn create_newsml_table() -> TableSpec {
    TableSpec::new()
        .with_field(
            Field::Headline,
            [
                RuleSpec::path(".//NewsLines/HeadLine"),
                // Lead paragraph of the body
                RuleSpec::path(".//body.content/p").with_deep_text(),
            ],
        )
        .with_field(
            Field::Topic,
            [
                RuleSpec::path(".//Identification/NameLabel"),
                RuleSpec::path(".//NewsLines/SlugLine"),
            ],
        )
        .with_field(
            Field::Tags,
            [
                // AFP packs several subjects into one FormalName: "Politics--Diplomacy"
                RuleSpec::path(".//DescriptiveMetadata/OfInterestTo/@FormalName")
                    .collect_all()
                    .with_split_on("--"),
                RuleSpec::path(".//DescriptiveMetadata/Property[@FormalName='Keyword']/@Value")
                    .collect_all(),
            ],
        )
        .with_field(
            Field::Authors,
            [
                RuleSpec::path(".//NewsLines/ByLine").collect_all(),
                RuleSpec::path(".//Provider/Party/@FormalName").collect_all(),
            ],
        )
        .with_field(
            Field::Date,
            [
                RuleSpec::path(".//NewsManagement/FirstCreated").as_timestamp(),
                RuleSpec::path(".//NewsManagement/ThisRevisionCreated").as_timestamp(),
                RuleSpec::path(".//NewsEnvelope/DateAndTime").as_timestamp(),
                RuleSpec::path(".//story.date/@norm").as_timestamp(),
                RuleSpec::path(".//date.issue/@norm").as_timestamp(),
            ],
        )
        .with_field(
            Field::Content,
            [
                RuleSpec::path(".//ContentItem//DataContent//p")
                    .with_deep_text()
                    .joined(DEFAULT_CONTENT_SEPARATOR),
                RuleSpec::path(".//body.content/p")
                    .with_deep_text()
                    .joined(DEFAULT_CONTENT_SEPARATOR),
            ],
        )
        .with_field(
            Field::Location,
            [
                // City and country always come from the same Location block
                RuleSpec::composite(
                    [
                        ".//Property[@FormalName='City']/@Value",
                        ".//Property[@FormalName='Country']/@Value",
                    ],
                    DEFAULT_LOCATION_SEPARATOR,
                )
                .within(".//Location"),
                RuleSpec::path(".//dateline/location").with_deep_text(),
            ],
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Collect;

    #[test]
    fn test_every_field_declared() {
        let table = create_newsml_table();
        for field in Field::ALL {
            assert!(table.fields.contains_key(&field), "{field} missing");
        }
        assert!(table.namespaces.is_empty());
    }

    #[test]
    fn test_headline_prefers_newslines() {
        let table = create_newsml_table();
        let headline = &table.fields[&Field::Headline];
        assert_eq!(headline[0].path.as_deref(), Some(".//NewsLines/HeadLine"));
        assert_eq!(headline[0].collect, Collect::First);
    }

    #[test]
    fn test_date_rules_are_timestamps() {
        let table = create_newsml_table();
        let date = &table.fields[&Field::Date];
        assert_eq!(date.len(), 5);
        assert!(date.iter().all(|rule| rule.timestamp));
    }

    #[test]
    fn test_location_scoped_to_one_block() {
        let table = create_newsml_table();
        let location = &table.fields[&Field::Location][0];
        assert_eq!(location.context.as_deref(), Some(".//Location"));
        assert_eq!(location.parts.len(), 2);
    }

    #[test]
    fn test_list_fields_collect_all() {
        let table = create_newsml_table();
        for field in [Field::Tags, Field::Authors] {
            assert!(table.fields[&field]
                .iter()
                .all(|rule| rule.collect == Collect::All));
        }
    }
}
