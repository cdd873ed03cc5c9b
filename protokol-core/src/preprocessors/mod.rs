//! Document Preprocessors
//!
//! This module converts document containers into the `SourceDocument` the
//! extraction rules read.
//!
//! ## Architecture
//!
//! ```text
//! Document (DOCX)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! SourceDocument (paragraphs + tables)
//!     ↓
//! [RuleEngine] → ProtocolRecord → [RowFlattener] → OutputRow
//! ```

pub mod docx;
pub mod preprocessor;

// Re-export main types
pub use docx::DocxPreprocessor;
pub use preprocessor::Preprocessor;
