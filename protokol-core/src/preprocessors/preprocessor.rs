// Preprocessor abstraction for document processing
//
// This module defines the boundary between reading a document container
// (DOCX -> paragraphs + tables) and extraction (SourceDocument -> rows).
// Everything after this point works with SourceDocument and is
// format-agnostic.

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::*;
use std::path::Path;

/// Preprocessor trait - converts documents to a SourceDocument
///
/// The preprocessing happens in two clear steps:
/// 1. Document -> markup (for DOCX: the `word/document.xml` part)
/// 2. Markup -> SourceDocument (body paragraphs and table grids)
pub trait Preprocessor: Send + Sync {
    /// Step 1: Pull the main markup out of the document container
    fn parse_document_to_markup(&self, bytes: &[u8]) -> ProtocolResult<String>;

    /// Step 2: Convert markup into paragraphs and tables
    fn parse_markup_to_source(&self, markup: &str) -> ProtocolResult<SourceDocument>;

    /// Full document processing (combines both steps)
    fn process(&self, bytes: &[u8]) -> ProtocolResult<SourceDocument> {
        let markup = self.parse_document_to_markup(bytes)?;
        self.parse_markup_to_source(&markup)
    }

    /// Reads the file and processes its bytes
    fn process_file(&self, input: &Path) -> ProtocolResult<SourceDocument> {
        if !self.supports_file_type(input) {
            return Err(ProtocolError::UnsupportedFile(input.to_path_buf()));
        }
        let bytes = std::fs::read(input).map_err(|source| ProtocolError::Read {
            path: input.to_path_buf(),
            source,
        })?;
        self.process(&bytes)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}
