//! ZIP container access for reading document parts and writing workbooks

use crate::error::ProtocolResult;
use std::io::{Read, Seek, Write};
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub trait ZipHelper<RS: Read + Seek> {
    /// Entry by name, matched case-insensitively with `\` treated as `/`
    fn file(&mut self, name: &str) -> ProtocolResult<Option<ZipFile<'_, RS>>>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&mut self, name: &str) -> ProtocolResult<Option<ZipFile<'_, RS>>> {
        let pattern = name.replace('\\', "/");
        let path = self
            .file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(&file_name.replace('\\', "/")))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

/// Writes whole parts into a new archive, deflated
pub struct PartWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl<W: Write + Seek> PartWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
        }
    }

    pub fn write_part(&mut self, name: &str, content: &[u8]) -> ProtocolResult<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    pub fn finish(self) -> ProtocolResult<W> {
        Ok(self.zip.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parts_round_trip_with_case_insensitive_lookup() {
        let mut writer = PartWriter::new(Cursor::new(Vec::new()));
        writer.write_part("word/document.xml", b"<w:document/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        archive
            .file("Word\\Document.xml")
            .unwrap()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<w:document/>");
        assert!(archive.file("word/missing.xml").unwrap().is_none());
    }
}
