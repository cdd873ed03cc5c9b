use std::path::PathBuf;
use thiserror::Error;

/// Document-level and sink-level failures.
///
/// Extraction itself never fails; these only cover opening a document and
/// writing the output.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed document XML: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("malformed document XML: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("unknown XML entity: &{0};")]
    XmlEntity(String),

    #[error("document part not found: {0}")]
    MissingPart(String),

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("invalid label pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to serialize rows: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write {}: {message}", path.display())]
    Sink { path: PathBuf, message: String },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
