//! WordprocessingML body parser
//!
//! Walks `word/document.xml` and produces the two streams the extraction
//! rules read:
//! - body paragraphs (`w:p` directly under the body, outside any table)
//! - top-level tables (`w:tbl`), one `Row` per `w:tr`
//!
//! A horizontally spanned cell (`w:gridSpan`) fills every column it covers;
//! a vertically merged continuation cell (`w:vMerge` without `restart`)
//! repeats the value above it.
//!
//! Within a paragraph only run content counts: `w:t` text, `w:tab` as a tab,
//! `w:br`/`w:cr` as a line break. Text boxes and deleted runs are skipped.
//! Nested tables contribute nothing, neither as tables nor as cell text.

use crate::error::ProtocolResult;
use crate::helpers::xml::{XmlNodeHelper, XmlReader, XmlTextHelper};
use crate::types::*;
use quick_xml::events::Event;

const TAG_PARAGRAPH: &[u8] = b"w:p";
const TAG_RUN: &[u8] = b"w:r";
const TAG_TEXT: &[u8] = b"w:t";
const TAG_TAB: &[u8] = b"w:tab";
const TAG_BREAK: &[u8] = b"w:br";
const TAG_CARRIAGE_RETURN: &[u8] = b"w:cr";
const TAG_TABLE: &[u8] = b"w:tbl";
const TAG_TABLE_ROW: &[u8] = b"w:tr";
const TAG_TABLE_CELL: &[u8] = b"w:tc";
const TAG_GRID_SPAN: &[u8] = b"w:gridSpan";
const TAG_VERTICAL_MERGE: &[u8] = b"w:vMerge";
const TAG_TEXT_BOX: &[u8] = b"w:txbxContent";
const TAG_DELETED: &[u8] = b"w:del";

const ATTR_VALUE: &str = "w:val";
const MERGE_RESTART: &str = "restart";

/// Cell under construction: its paragraphs, horizontal span and whether it
/// continues a vertical merge
#[derive(Default)]
struct CellBuilder {
    paragraphs: Vec<String>,
    span: usize,
    merged: bool,
}

impl CellBuilder {
    fn text(&self) -> String {
        self.paragraphs.join("\n").trim().to_string()
    }
}

#[derive(Default)]
struct BodyState {
    paragraphs: Vec<String>,
    tables: Vec<Table>,

    /// Open `w:tbl` elements; 1 means inside a top-level table
    table_depth: usize,
    rows: Vec<Row>,
    row: Option<Row>,
    cell: Option<CellBuilder>,

    paragraph: Option<String>,
    run_depth: usize,
    in_text: bool,
    /// Open text boxes and deletions; content inside either is dropped
    skip_depth: usize,
}

impl BodyState {
    fn collecting(&self) -> bool {
        self.skip_depth == 0 && self.table_depth <= 1
    }

    fn push_char(&mut self, character: char) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.push(character);
        }
    }

    fn start(&mut self, name: &[u8]) {
        if name == TAG_TEXT_BOX || name == TAG_DELETED {
            self.skip_depth += 1;
            return;
        }
        if name == TAG_TABLE {
            self.table_depth += 1;
            if self.table_depth == 1 {
                self.rows = Vec::new();
            }
            return;
        }
        if !self.collecting() {
            return;
        }

        match name {
            TAG_TABLE_ROW if self.table_depth == 1 => self.row = Some(Row::new()),
            TAG_TABLE_CELL if self.table_depth == 1 => {
                self.cell = Some(CellBuilder {
                    paragraphs: Vec::new(),
                    span: 1,
                    merged: false,
                })
            }
            TAG_PARAGRAPH => self.paragraph = Some(String::new()),
            TAG_RUN => self.run_depth += 1,
            TAG_TEXT if self.run_depth > 0 => self.in_text = true,
            TAG_TAB if self.run_depth > 0 => self.push_char('\t'),
            TAG_BREAK | TAG_CARRIAGE_RETURN if self.run_depth > 0 => self.push_char('\n'),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        if name == TAG_TEXT_BOX || name == TAG_DELETED {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if name == TAG_TABLE {
            if self.table_depth == 1 {
                self.tables.push(Table::new(std::mem::take(&mut self.rows)));
            }
            self.table_depth = self.table_depth.saturating_sub(1);
            return;
        }
        if !self.collecting() {
            return;
        }

        match name {
            TAG_TEXT => self.in_text = false,
            TAG_RUN => self.run_depth = self.run_depth.saturating_sub(1),
            TAG_PARAGRAPH => {
                let Some(paragraph) = self.paragraph.take() else {
                    return;
                };
                match self.cell.as_mut() {
                    Some(cell) if self.table_depth == 1 => cell.paragraphs.push(paragraph),
                    _ if self.table_depth == 0 => self.paragraphs.push(paragraph),
                    _ => {}
                }
            }
            TAG_TABLE_CELL if self.table_depth == 1 => {
                if let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) {
                    let text = if cell.merged {
                        self.rows
                            .last()
                            .and_then(|above| above.get(row.len()))
                            .cloned()
                            .unwrap_or_default()
                    } else {
                        cell.text()
                    };
                    for _ in 0..cell.span.max(1) {
                        row.push(text.clone());
                    }
                }
            }
            TAG_TABLE_ROW if self.table_depth == 1 => {
                if let Some(row) = self.row.take() {
                    self.rows.push(row);
                }
            }
            _ => {}
        }
    }
}

/// Parse the main document part into paragraphs and tables
pub fn parse_document_xml(xml: &str) -> ProtocolResult<SourceDocument> {
    let mut reader = XmlReader::new(xml.as_bytes());
    let mut state = BodyState::default();

    while let Some(event) = reader.next()? {
        match event {
            Event::Start(element) => {
                let in_cell = state.collecting() && state.table_depth == 1;
                if element.name().as_ref() == TAG_VERTICAL_MERGE && in_cell {
                    let merged =
                        element.attribute_value(ATTR_VALUE)?.as_deref() != Some(MERGE_RESTART);
                    if let Some(cell) = state.cell.as_mut() {
                        cell.merged = merged;
                    }
                }
                if element.name().as_ref() == TAG_GRID_SPAN && in_cell {
                    let span = element
                        .attribute_value(ATTR_VALUE)?
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(1);
                    if let Some(cell) = state.cell.as_mut() {
                        cell.span = span;
                    }
                }
                state.start(element.name().as_ref());
            }
            Event::End(element) => state.end(element.name().as_ref()),
            Event::Text(text) if state.in_text && state.collecting() => {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.push_bytes_text(&text)?;
                }
            }
            Event::GeneralRef(reference) if state.in_text && state.collecting() => {
                if let Some(paragraph) = state.paragraph.as_mut() {
                    paragraph.push_bytes_ref(&reference)?;
                }
            }
            _ => {}
        }
    }

    Ok(SourceDocument::new(state.paragraphs, state.tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(content: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{content}</w:body></w:document>"#
        )
    }

    #[test]
    fn paragraphs_keep_runs_tabs_and_breaks() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
<w:r><w:t>ПРОТОКОЛ № </w:t></w:r><w:r><w:t>12</w:t></w:r></w:p>
<w:p><w:r><w:t>Іванов</w:t><w:tab/><w:t>за</w:t><w:br/><w:t>далі</w:t></w:r></w:p>
<w:p/>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(
            document.paragraphs,
            vec!["ПРОТОКОЛ № 12", "Іванов\tза\nдалі", ""]
        );
        assert!(document.tables.is_empty());
    }

    #[test]
    fn entities_are_resolved() {
        let xml = body(r#"<w:p><w:r><w:t>«05» &amp; &#x41;&#66;</w:t></w:r></w:p>"#);
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.paragraphs, vec!["«05» & AB"]);
    }

    #[test]
    fn tables_are_separate_from_paragraphs() {
        let xml = body(
            r#"<w:p><w:r><w:t>До таблиці</w:t></w:r></w:p>
<w:tbl>
  <w:tr>
    <w:tc><w:p><w:r><w:t>Голова комітету:</w:t></w:r></w:p></w:tc>
    <w:tc><w:p><w:r><w:t> перший </w:t></w:r></w:p><w:p><w:r><w:t>другий</w:t></w:r></w:p></w:tc>
  </w:tr>
  <w:tr>
    <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>на дві</w:t></w:r></w:p></w:tc>
  </w:tr>
</w:tbl>
<w:p><w:r><w:t>Після таблиці</w:t></w:r></w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();

        assert_eq!(document.paragraphs, vec!["До таблиці", "Після таблиці"]);
        assert_eq!(document.tables.len(), 1);
        assert_eq!(
            document.tables[0].rows,
            vec![
                vec!["Голова комітету:".to_string(), "перший \nдругий".to_string()],
                vec!["на дві".to_string(), "на дві".to_string()],
            ]
        );
    }

    #[test]
    fn vertically_merged_cells_repeat_the_value_above() {
        let xml = body(
            r#"<w:tbl>
  <w:tr>
    <w:tc><w:tcPr><w:vMerge w:val="restart"/></w:tcPr><w:p><w:r><w:t>Члени комітету:</w:t></w:r></w:p></w:tc>
    <w:tc><w:p><w:r><w:t>Коваль О.І.</w:t></w:r></w:p></w:tc>
  </w:tr>
  <w:tr>
    <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
    <w:tc><w:p><w:r><w:t>Бондар Б.Б.</w:t></w:r></w:p></w:tc>
  </w:tr>
  <w:tr>
    <w:tc><w:tcPr><w:vMerge w:val="continue"/></w:tcPr><w:p/></w:tc>
    <w:tc><w:tcPr><w:vMerge/></w:tcPr><w:p/></w:tc>
  </w:tr>
</w:tbl>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        let label = "Члени комітету:".to_string();
        assert_eq!(
            document.tables[0].rows,
            vec![
                vec![label.clone(), "Коваль О.І.".to_string()],
                vec![label.clone(), "Бондар Б.Б.".to_string()],
                vec![label, "Бондар Б.Б.".to_string()],
            ]
        );
    }

    #[test]
    fn nested_tables_are_ignored() {
        let xml = body(
            r#"<w:tbl><w:tr><w:tc>
  <w:p><w:r><w:t>зовнішня</w:t></w:r></w:p>
  <w:tbl><w:tr><w:tc><w:p><w:r><w:t>вкладена</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
  <w:p/>
</w:tc></w:tr></w:tbl>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.tables.len(), 1);
        assert_eq!(document.tables[0].rows, vec![vec!["зовнішня".to_string()]]);
    }

    #[test]
    fn text_boxes_and_deletions_are_skipped() {
        let xml = body(
            r#"<w:p>
  <w:r><w:t>Кворум: </w:t></w:r>
  <w:del w:id="1"><w:r><w:delText>ні</w:delText><w:t>стерто</w:t></w:r></w:del>
  <w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>напис</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r>
  <w:ins w:id="2"><w:r><w:t>є</w:t></w:r></w:ins>
</w:p>"#,
        );
        let document = parse_document_xml(&xml).unwrap();
        assert_eq!(document.paragraphs, vec!["Кворум: є"]);
    }
}
