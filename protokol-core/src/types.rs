use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// ===== SOURCE DOCUMENT =====
// What a preprocessor hands to the engine: body paragraphs plus table grids.
// Read-only from here on.

/// One row of a table: cell texts in column order. Rows may be short.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Trimmed cell text, or "" when the row is shorter than `col`
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
}

impl SourceDocument {
    pub fn new(paragraphs: Vec<String>, tables: Vec<Table>) -> Self {
        Self { paragraphs, tables }
    }

    /// Build a table-less document from a text blob (one paragraph per line)
    pub fn from_text(text: &str) -> Self {
        Self {
            paragraphs: text.split('\n').map(str::to_string).collect(),
            tables: Vec::new(),
        }
    }

    /// All paragraphs joined with newlines; the text every rule reads
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn first_table(&self) -> Option<&Table> {
        self.tables.first()
    }
}

// ===== FIELD VALUES =====

/// Tri-state cell value.
///
/// `Blank` means the field exists for this row but the source had nothing;
/// `Absent` means the field does not apply to this row at all (continuation
/// rows of the flattened output). Sinks must keep the two apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Absent,
    Blank,
    Present(String),
}

impl Field {
    /// Wrap extracted text; empty text becomes `Blank`, never `Absent`
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Field::Blank
        } else {
            Field::Present(value)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// Text view: "" for both `Blank` and `Absent`
    pub fn as_str(&self) -> &str {
        match self {
            Field::Present(value) => value,
            Field::Blank | Field::Absent => "",
        }
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            Field::Absent => None,
            other => Some(other.as_str()),
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_option() {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_none(),
        }
    }
}

// ===== MEETING INFO =====

/// Logical meeting-level fields located through label anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingField {
    Chair,
    DeputyChair,
    Secretary,
    Members,
    Absentees,
    Invitees,
    Quorum,
    DecisionProcedure,
}

impl MeetingField {
    pub const ALL: [MeetingField; 8] = [
        MeetingField::Chair,
        MeetingField::DeputyChair,
        MeetingField::Secretary,
        MeetingField::Members,
        MeetingField::Absentees,
        MeetingField::Invitees,
        MeetingField::Quorum,
        MeetingField::DecisionProcedure,
    ];

    /// Members is the only field kept as a list; everything else is one string
    pub fn is_list(&self) -> bool {
        matches!(self, MeetingField::Members)
    }

    fn empty_value(&self) -> MeetingValue {
        if self.is_list() {
            MeetingValue::List(Vec::new())
        } else {
            MeetingValue::Text(String::new())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeetingValue {
    Text(String),
    List(Vec<String>),
}

impl MeetingValue {
    /// Single-cell rendering: lists are joined with ", "
    pub fn joined(&self) -> String {
        match self {
            MeetingValue::Text(text) => text.clone(),
            MeetingValue::List(items) => items.join(", "),
        }
    }
}

/// Role name → value. Every `MeetingField` key is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfo {
    values: BTreeMap<MeetingField, MeetingValue>,
}

impl Default for MeetingInfo {
    fn default() -> Self {
        let values = MeetingField::ALL
            .iter()
            .map(|field| (*field, field.empty_value()))
            .collect();
        Self { values }
    }
}

impl MeetingInfo {
    /// Store a value, coercing it to the field's shape (text vs list)
    pub fn set(&mut self, field: MeetingField, value: MeetingValue) {
        let value = match (field.is_list(), value) {
            (true, MeetingValue::Text(text)) if text.is_empty() => MeetingValue::List(Vec::new()),
            (true, MeetingValue::Text(text)) => MeetingValue::List(vec![text]),
            (false, MeetingValue::List(items)) => MeetingValue::Text(items.join(", ")),
            (_, value) => value,
        };
        self.values.insert(field, value);
    }

    pub fn get(&self, field: MeetingField) -> MeetingValue {
        self.values
            .get(&field)
            .cloned()
            .unwrap_or_else(|| field.empty_value())
    }

    pub fn text(&self, field: MeetingField) -> String {
        self.get(field).joined()
    }

    pub fn list(&self, field: MeetingField) -> Vec<String> {
        match self.get(field) {
            MeetingValue::List(items) => items,
            MeetingValue::Text(text) if text.is_empty() => Vec::new(),
            MeetingValue::Text(text) => vec![text],
        }
    }
}

// ===== DOCUMENT IDENTITY / AGENDA / ROLL CALL =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIdentity {
    pub number: String,
    /// `DD.MM.YYYY`, or the raw `day month year` fallback, or ""
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(rename = "for")]
    pub in_favor: String,
    pub against: String,
    pub abstain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub text: String,
    pub speaker: String,
    pub votes: VoteTally,
    pub decision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVote {
    pub full_name: String,
    #[serde(rename = "for")]
    pub in_favor: String,
    pub against: String,
    pub abstain: String,
    pub note: String,
}

/// Everything extracted from one document, before flattening
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub meeting: MeetingInfo,
    pub identity: DocumentIdentity,
    pub agenda: Vec<AgendaItem>,
    pub roll_call: Vec<MemberVote>,
}

// ===== OUTPUT ROWS =====

/// Output columns in sheet order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    FileName,
    Date,
    ProtocolNumber,
    Chair,
    DeputyChair,
    Members,
    Secretary,
    Absentees,
    Invitees,
    Quorum,
    DecisionProcedure,
    AgendaText,
    Speaker,
    VotesFor,
    VotesAgainst,
    VotesAbstain,
    Decision,
    MemberName,
    MemberFor,
    MemberAgainst,
    MemberAbstain,
    MemberNote,
}

pub const COLUMN_COUNT: usize = 22;

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::FileName,
        Column::Date,
        Column::ProtocolNumber,
        Column::Chair,
        Column::DeputyChair,
        Column::Members,
        Column::Secretary,
        Column::Absentees,
        Column::Invitees,
        Column::Quorum,
        Column::DecisionProcedure,
        Column::AgendaText,
        Column::Speaker,
        Column::VotesFor,
        Column::VotesAgainst,
        Column::VotesAbstain,
        Column::Decision,
        Column::MemberName,
        Column::MemberFor,
        Column::MemberAgainst,
        Column::MemberAbstain,
        Column::MemberNote,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Sheet header, as the downstream spreadsheets expect it
    pub fn header(self) -> &'static str {
        match self {
            Column::FileName => "Файл",
            Column::Date => "Дата",
            Column::ProtocolNumber => "Номер протоколу",
            Column::Chair => "Голова комітету",
            Column::DeputyChair => "Заступник Голови комітету",
            Column::Members => "Члени комітету",
            Column::Secretary => "Секретар комітету",
            Column::Absentees => "Відсутні",
            Column::Invitees => "Запрошені",
            Column::Quorum => "Кворум",
            Column::DecisionProcedure => "Порядок прийняття рішень",
            Column::AgendaText => "ПОРЯДОК ДЕННИЙ",
            Column::Speaker => "Виступив:",
            Column::VotesFor => "Голосували: за",
            Column::VotesAgainst => "Голосували: проти",
            Column::VotesAbstain => "Голосували: утримались",
            Column::Decision => "Вирішили:",
            Column::MemberName => "ПІБ",
            Column::MemberFor => "за",
            Column::MemberAgainst => "проти",
            Column::MemberAbstain => "утримались",
            Column::MemberNote => "примітка",
        }
    }

    /// Columns filled on continuation rows
    pub fn is_member_column(self) -> bool {
        matches!(
            self,
            Column::MemberName
                | Column::MemberFor
                | Column::MemberAgainst
                | Column::MemberAbstain
                | Column::MemberNote
        )
    }
}

/// One flat output record. Starts with every column `Absent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRow {
    cells: [Field; COLUMN_COUNT],
}

impl OutputRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: Column, value: Field) {
        self.cells[column.index()] = value;
    }

    pub fn with(mut self, column: Column, value: Field) -> Self {
        self.set(column, value);
        self
    }

    pub fn get(&self, column: Column) -> &Field {
        &self.cells[column.index()]
    }

    pub fn cells(&self) -> impl Iterator<Item = (Column, &Field)> {
        Column::ALL.iter().map(move |c| (*c, &self.cells[c.index()]))
    }

    /// Continuation rows carry no meeting-level data. The members column
    /// may repeat the member's name and does not count.
    pub fn is_continuation(&self) -> bool {
        self.cells()
            .filter(|(column, _)| !column.is_member_column() && *column != Column::Members)
            .all(|(_, field)| field.is_absent())
    }
}

// Serialized as an object keyed by header, in column order
impl Serialize for OutputRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COLUMN_COUNT))?;
        for (column, field) in self.cells() {
            map.serialize_entry(column.header(), field)?;
        }
        map.end()
    }
}
