use super::xlsx;
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Default output file, written to the working directory
pub const DEFAULT_OUTPUT: &str = "TOTAL_PROTOKOL.xlsx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Json,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Format implied by the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

/// JSON rendition of the output sheet. Absent cells serialize as `null`,
/// blank cells as `""`.
#[derive(Debug, Serialize)]
pub struct RowSet<'a> {
    pub format: &'static str,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<&'static str>,
    pub rows: &'a [OutputRow],
}

impl<'a> RowSet<'a> {
    pub fn new(rows: &'a [OutputRow]) -> Self {
        Self {
            format: "protocol_rows",
            generated_at: Utc::now(),
            columns: Column::ALL.iter().map(|c| c.header()).collect(),
            rows,
        }
    }
}

fn sink_error(path: &Path, error: impl std::fmt::Display) -> ProtocolError {
    ProtocolError::Sink {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

/// Write all rows to `path`. Any failure here aborts the run; nothing is
/// retried and a partially written file may remain.
pub fn save_rows(rows: &[OutputRow], path: &Path, format: OutputFormat) -> ProtocolResult<()> {
    let file = File::create(path).map_err(|e| sink_error(path, e))?;
    let writer = BufWriter::new(file);

    let mut writer = match format {
        OutputFormat::Xlsx => xlsx::write_workbook(rows, writer).map_err(|e| sink_error(path, e))?,
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &RowSet::new(rows))
                .map_err(|e| sink_error(path, e))?;
            writer
        }
    };
    writer.flush().map_err(|e| sink_error(path, e))?;

    info!("💾 Saved {} rows to {} ({})", rows.len(), path.display(), format.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_name_and_path() {
        assert_eq!(OutputFormat::from_name("XLSX"), Some(OutputFormat::Xlsx));
        assert_eq!(OutputFormat::from_name("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("csv"), None);
        assert_eq!(
            OutputFormat::from_path(Path::new(DEFAULT_OUTPUT)),
            Some(OutputFormat::Xlsx)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn row_set_lists_columns_in_order() {
        let rows = vec![OutputRow::new().with(Column::MemberName, Field::text("Іванов"))];
        let value = serde_json::to_value(RowSet::new(&rows)).unwrap();

        let columns = value["columns"].as_array().unwrap();
        assert_eq!(columns.len(), COLUMN_COUNT);
        assert_eq!(columns[0], "Файл");
        assert_eq!(columns[21], "примітка");
        assert_eq!(value["rows"][0]["ПІБ"], "Іванов");
        assert!(value["rows"][0]["Файл"].is_null());
    }

    #[test]
    fn unwritable_path_is_a_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let error = save_rows(&[], &path, OutputFormat::Json).unwrap_err();
        assert!(matches!(error, ProtocolError::Sink { .. }));
    }
}
