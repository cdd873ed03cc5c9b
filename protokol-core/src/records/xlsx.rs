//! Minimal SpreadsheetML writer: one worksheet, header row, inline strings.
//!
//! `Field::Absent` cells are left out of the sheet entirely, `Field::Blank`
//! cells are written as empty strings, so a reader can still tell the two
//! apart. Each column is sized to its longest value (in characters) plus two.

use crate::error::ProtocolResult;
use crate::helpers::zip::PartWriter;
use crate::types::*;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::{Cursor, Seek, Write};

pub const SHEET_NAME: &str = "Sheet1";

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const PART_CONTENT_TYPES: &str = "[Content_Types].xml";
const PART_ROOT_RELS: &str = "_rels/.rels";
const PART_WORKBOOK: &str = "xl/workbook.xml";
const PART_WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
pub const PART_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|b| *b as char).collect()
}

/// Characters XML 1.0 cannot carry are dropped
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Column widths: longest header or value in characters, plus two
pub fn column_widths(rows: &[OutputRow]) -> Vec<usize> {
    Column::ALL
        .iter()
        .map(|column| {
            let longest_value = rows
                .iter()
                .map(|row| row.get(*column).as_str().chars().count())
                .max()
                .unwrap_or(0);
            longest_value.max(column.header().chars().count()) + 2
        })
        .collect()
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn new_part() -> ProtocolResult<XmlWriter> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(writer)
}

fn into_bytes(writer: XmlWriter) -> Vec<u8> {
    writer.into_inner().into_inner()
}

fn content_types() -> ProtocolResult<Vec<u8>> {
    let mut writer = new_part()?;
    writer.write_event(Event::Start(
        BytesStart::new("Types").with_attributes([("xmlns", NS_CONTENT_TYPES)]),
    ))?;
    writer.write_event(Event::Empty(BytesStart::new("Default").with_attributes([
        ("Extension", "rels"),
        ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("Default").with_attributes([
        ("Extension", "xml"),
        ("ContentType", "application/xml"),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
        ("PartName", "/xl/workbook.xml"),
        (
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
        ),
    ])))?;
    writer.write_event(Event::Empty(BytesStart::new("Override").with_attributes([
        ("PartName", "/xl/worksheets/sheet1.xml"),
        (
            "ContentType",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
        ),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Types")))?;
    Ok(into_bytes(writer))
}

fn relationships(kind: &str, target: &str) -> ProtocolResult<Vec<u8>> {
    let mut writer = new_part()?;
    writer.write_event(Event::Start(
        BytesStart::new("Relationships").with_attributes([("xmlns", NS_PACKAGE_RELATIONSHIPS)]),
    ))?;
    let kind = format!("{NS_RELATIONSHIPS}/{kind}");
    writer.write_event(Event::Empty(BytesStart::new("Relationship").with_attributes([
        ("Id", "rId1"),
        ("Type", kind.as_str()),
        ("Target", target),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("Relationships")))?;
    Ok(into_bytes(writer))
}

fn workbook() -> ProtocolResult<Vec<u8>> {
    let mut writer = new_part()?;
    writer.write_event(Event::Start(
        BytesStart::new("workbook")
            .with_attributes([("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    writer.write_event(Event::Empty(BytesStart::new("sheet").with_attributes([
        ("name", SHEET_NAME),
        ("sheetId", "1"),
        ("r:id", "rId1"),
    ])))?;
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(into_bytes(writer))
}

fn write_cell(writer: &mut XmlWriter, reference: &str, text: &str) -> ProtocolResult<()> {
    writer.write_event(Event::Start(
        BytesStart::new("c").with_attributes([("r", reference), ("t", "inlineStr")]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("is")))?;
    writer.write_event(Event::Start(
        BytesStart::new("t").with_attributes([("xml:space", "preserve")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    writer.write_event(Event::End(BytesEnd::new("is")))?;
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn worksheet(rows: &[OutputRow]) -> ProtocolResult<Vec<u8>> {
    let mut writer = new_part()?;
    writer.write_event(Event::Start(
        BytesStart::new("worksheet").with_attributes([("xmlns", NS_MAIN)]),
    ))?;

    writer.write_event(Event::Start(BytesStart::new("cols")))?;
    for (index, width) in column_widths(rows).iter().enumerate() {
        let position = (index + 1).to_string();
        let width = width.to_string();
        writer.write_event(Event::Empty(BytesStart::new("col").with_attributes([
            ("min", position.as_str()),
            ("max", position.as_str()),
            ("width", width.as_str()),
            ("customWidth", "1"),
        ])))?;
    }
    writer.write_event(Event::End(BytesEnd::new("cols")))?;

    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    writer.write_event(Event::Start(
        BytesStart::new("row").with_attributes([("r", "1")]),
    ))?;
    for column in Column::ALL {
        let reference = format!("{}1", column_letter(column.index()));
        write_cell(&mut writer, &reference, column.header())?;
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;

    for (offset, row) in rows.iter().enumerate() {
        let number = (offset + 2).to_string();
        writer.write_event(Event::Start(
            BytesStart::new("row").with_attributes([("r", number.as_str())]),
        ))?;
        for (column, field) in row.cells() {
            let Some(text) = field.as_option() else {
                continue;
            };
            let reference = format!("{}{}", column_letter(column.index()), number);
            write_cell(&mut writer, &reference, text)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(into_bytes(writer))
}

/// Write a complete workbook into `sink`
pub fn write_workbook<W: Write + Seek>(rows: &[OutputRow], sink: W) -> ProtocolResult<W> {
    let mut parts = PartWriter::new(sink);
    parts.write_part(PART_CONTENT_TYPES, &content_types()?)?;
    parts.write_part(PART_ROOT_RELS, &relationships("officeDocument", PART_WORKBOOK)?)?;
    parts.write_part(PART_WORKBOOK, &workbook()?)?;
    parts.write_part(
        PART_WORKBOOK_RELS,
        &relationships("worksheet", "worksheets/sheet1.xml")?,
    )?;
    parts.write_part(PART_SHEET, &worksheet(rows)?)?;
    parts.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::zip::ZipHelper;
    use std::io::Read;
    use zip::ZipArchive;

    fn sheet_xml(rows: &[OutputRow]) -> String {
        let bytes = write_workbook(rows, Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .file(PART_SHEET)
            .unwrap()
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(21), "V");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
    }

    #[test]
    fn workbook_has_all_parts() {
        let bytes = write_workbook(&[], Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            PART_CONTENT_TYPES,
            PART_ROOT_RELS,
            PART_WORKBOOK,
            PART_WORKBOOK_RELS,
            PART_SHEET,
        ] {
            assert!(archive.file(part).unwrap().is_some(), "{part}");
        }
    }

    #[test]
    fn absent_cells_are_omitted_and_blank_cells_kept() {
        let row = OutputRow::new()
            .with(Column::FileName, Field::text("a.docx"))
            .with(Column::Date, Field::Blank);
        let xml = sheet_xml(&[row]);

        assert!(xml.contains(r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">Файл</t></is></c>"#));
        assert!(xml.contains(r#"<c r="A2" t="inlineStr"><is><t xml:space="preserve">a.docx</t></is></c>"#));
        assert!(xml.contains(r#"<c r="B2" t="inlineStr"><is><t xml:space="preserve"></t></is></c>"#));
        assert!(!xml.contains(r#"r="C2""#));
    }

    #[test]
    fn text_is_escaped() {
        let row = OutputRow::new().with(Column::Decision, Field::text("A < B & \u{7}C"));
        let xml = sheet_xml(&[row]);
        assert!(xml.contains("A &lt; B &amp; C"));
    }

    #[test]
    fn widths_follow_longest_value() {
        let row = OutputRow::new().with(Column::Quorum, Field::text("є, кворум присутній"));
        let widths = column_widths(&[row]);
        assert_eq!(widths.len(), COLUMN_COUNT);
        assert_eq!(widths[Column::Quorum.index()], "є, кворум присутній".chars().count() + 2);
        assert_eq!(widths[Column::FileName.index()], "Файл".chars().count() + 2);
    }
}
