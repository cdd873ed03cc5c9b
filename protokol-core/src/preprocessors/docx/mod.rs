//! DOCX Preprocessor
//!
//! Opens the WordprocessingML container, reads its main document part and
//! hands it to the body parser.

pub mod document_xml;

use crate::error::{ProtocolError, ProtocolResult};
use crate::helpers::zip::ZipHelper;
use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::*;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

pub use document_xml::parse_document_xml;

/// Main document part inside the container
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone)]
pub struct DocxPreprocessor;

impl DocxPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for DocxPreprocessor {
    fn parse_document_to_markup(&self, bytes: &[u8]) -> ProtocolResult<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut part = archive
            .file(DOCUMENT_PART)?
            .ok_or_else(|| ProtocolError::MissingPart(DOCUMENT_PART.to_string()))?;

        let mut markup = String::new();
        part.read_to_string(&mut markup)?;
        Ok(markup)
    }

    fn parse_markup_to_source(&self, markup: &str) -> ProtocolResult<SourceDocument> {
        parse_document_xml(markup)
    }

    fn name(&self) -> &str {
        "DOCX"
    }

    /// `.docx` in any letter case; Word lock files (`~$name.docx`) are not documents
    fn supports_file_type(&self, path: &Path) -> bool {
        let is_docx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("docx"))
            .unwrap_or(false);
        let is_lock_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with("~$"))
            .unwrap_or(false);
        is_docx && !is_lock_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::zip::PartWriter;

    fn docx_bytes(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = PartWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.write_part(name, content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_document_part() {
        let bytes = docx_bytes(&[(
            DOCUMENT_PART,
            r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Кворум: є</w:t></w:r></w:p></w:body></w:document>"#,
        )]);
        let document = DocxPreprocessor::new().process(&bytes).unwrap();
        assert_eq!(document.text(), "Кворум: є");
    }

    #[test]
    fn missing_document_part_is_an_error() {
        let bytes = docx_bytes(&[("word/styles.xml", "<w:styles/>")]);
        let error = DocxPreprocessor::new().process(&bytes).unwrap_err();
        assert!(matches!(error, ProtocolError::MissingPart(_)));
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(DocxPreprocessor::new().process(b"not a zip").is_err());
    }

    #[test]
    fn file_type_support() {
        let preprocessor = DocxPreprocessor::new();
        assert!(preprocessor.supports_file_type(Path::new("dir/Протокол 1.docx")));
        assert!(preprocessor.supports_file_type(Path::new("P.DOCX")));
        assert!(!preprocessor.supports_file_type(Path::new("~$Протокол 1.docx")));
        assert!(!preprocessor.supports_file_type(Path::new("notes.doc")));
        assert!(!preprocessor.supports_file_type(Path::new("docx")));
    }
}
