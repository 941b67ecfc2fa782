//! Document loading: read bytes, decode to UTF-8, parse into a tree.
//!
//! The loader owns all file access. The resolver only ever sees a parsed
//! `roxmltree::Document`.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use roxmltree::{Document, ParsingOptions};

use crate::error::{ExtractorError, Result};

/// Match the `encoding` pseudo-attribute of the XML declaration.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static XML_DECL_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("valid regex")
});

/// Only the head of a document is inspected for the declaration.
const DECLARATION_SCAN_BYTES: usize = 256;

/// Detect the character encoding declared in the XML declaration.
///
/// Defaults to UTF-8 when there is no declaration or the label is unknown.
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let head = &bytes[..bytes.len().min(DECLARATION_SCAN_BYTES)];
    let head_str = String::from_utf8_lossy(head);

    XML_DECL_ENCODING
        .captures(&head_str)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode raw document bytes to a UTF-8 string.
///
/// A byte-order mark overrides the declared encoding. Invalid sequences are
/// replaced with U+FFFD and logged. When the document was transcoded, the
/// declaration is rewritten to `UTF-8` so it matches the returned text.
pub fn decode_document(bytes: &[u8], context: &str) -> String {
    let declared = detect_encoding(bytes);
    let (text, used, had_errors) = declared.decode(bytes);

    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "{context}: invalid byte sequences replaced during decoding"
        );
    }

    if used == UTF_8 {
        return text.into_owned();
    }

    tracing::debug!(encoding = used.name(), "{context}: transcoded to UTF-8");
    match XML_DECL_ENCODING.captures(&text).and_then(|caps| caps.get(1)) {
        Some(label) => {
            let mut rewritten = String::with_capacity(text.len());
            rewritten.push_str(&text[..label.start()]);
            rewritten.push_str("UTF-8");
            rewritten.push_str(&text[label.end()..]);
            rewritten
        }
        None => text.into_owned(),
    }
}

/// Read and decode a document from disk.
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(decode_document(&bytes, &path.display().to_string()))
}

/// Parse a decoded document.
///
/// Document type declarations are allowed since NewsML files usually carry
/// one. Input that is not well-formed fails with
/// [`ExtractorError::MalformedDocument`]; nothing is repaired.
pub fn parse_document<'input>(xml: &'input str, source_name: &str) -> Result<Document<'input>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;

    Document::parse_with_options(strip_bom(xml), options).map_err(|source| {
        ExtractorError::MalformedDocument {
            source_name: source_name.to_string(),
            source,
        }
    })
}

fn strip_bom(xml: &str) -> &str {
    xml.strip_prefix('\u{feff}').unwrap_or(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_encoding_declared() {
        let xml = br#"<?xml version="1.0" encoding="ISO-8859-1"?><NewsML/>"#;
        assert_eq!(detect_encoding(xml).name(), "windows-1252");
    }

    #[test]
    fn test_detect_encoding_default_utf8() {
        assert_eq!(detect_encoding(b"<NewsML/>"), UTF_8);
        let unknown = br#"<?xml version="1.0" encoding="x-made-up"?><NewsML/>"#;
        assert_eq!(detect_encoding(unknown), UTF_8);
    }

    #[test]
    fn test_decode_latin1_document() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><HeadLine>Caf"#.to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</HeadLine>");

        let text = decode_document(&bytes, "test");
        assert!(text.contains("encoding=\"UTF-8\""));
        assert!(text.contains("Caf\u{e9}"));

        let doc = parse_document(&text, "test").unwrap();
        assert_eq!(doc.root_element().text(), Some("Caf\u{e9}"));
    }

    #[test]
    fn test_parse_document_with_doctype() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE NewsML SYSTEM "http://www.afp.com/dtd/AFPNewsML.dtd">
<NewsML Version="1.2"><NewsItem/></NewsML>"#;
        let doc = parse_document(xml, "doctype.xml").unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "NewsML");
    }

    #[test]
    fn test_parse_document_malformed() {
        let err = parse_document("<NewsML><HeadLine>Cut off", "broken.xml").unwrap_err();
        match err {
            ExtractorError::MalformedDocument { source_name, .. } => {
                assert_eq!(source_name, "broken.xml");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_document_with_bom() {
        let xml = "\u{feff}<NewsML/>";
        assert!(parse_document(xml, "bom.xml").is_ok());
    }

    #[test]
    fn test_read_document_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<NewsML><NewsItem/></NewsML>").unwrap();

        let text = read_document(file.path()).unwrap();
        assert_eq!(text, "<NewsML><NewsItem/></NewsML>");
    }

    #[test]
    fn test_read_document_missing_file() {
        let err = read_document(Path::new("/definitely/not/here.xml")).unwrap_err();
        assert!(matches!(err, ExtractorError::Io(_)));
    }
}
