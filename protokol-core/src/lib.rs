// Protokol Core Library
//
// Extracts committee meeting protocols (DOCX minutes written to a fixed
// template) into flat spreadsheet rows: one row per agenda item and member.
// Main interface: DocumentProcessor (files in, rows out) and save_rows.

pub mod config;
pub mod error;
pub mod helpers;
pub mod preprocessors;
pub mod processor;
pub mod records;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{ConfigManager, ParsingConfig, TemplateVariant};
pub use error::{ProtocolError, ProtocolResult};
pub use preprocessors::{DocxPreprocessor, Preprocessor};
pub use processor::{BatchOutput, DocumentFailure, DocumentProcessor, ProcessedDocument, StepProfiler};
pub use records::{save_rows, OutputFormat, RowFlattener, DEFAULT_OUTPUT};
pub use rules::RuleEngine;
pub use types::*;
