use super::engine::ExtractionRule;
use crate::config::ParsingConfig;
use crate::error::ProtocolResult;
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Three capitalized Cyrillic words and nothing else: "Іванов Іван Іванович"
static NAME_ONLY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[А-ЯІЇЄҐ][а-яіїєґ]+\s+[А-ЯІЇЄҐ][а-яіїєґ]+\s+[А-ЯІЇЄҐ][а-яіїєґ]+$").unwrap()
});

/// Per-member votes from the trailing roll-call section.
pub struct RollCallExtractor {
    header_pattern: Regex,
    header_columns: Vec<String>,
    from_text: bool,
    table_fallback: bool,
}

impl RollCallExtractor {
    pub fn new(config: &ParsingConfig) -> ProtocolResult<Self> {
        let header_columns = config.labels.roll_call_header.clone();
        let signature = header_columns
            .iter()
            .map(|column| regex::escape(column))
            .collect::<Vec<_>>()
            .join(r"\s+");

        Ok(Self {
            header_pattern: Regex::new(&signature)?,
            header_columns,
            from_text: config.roll_call.from_text,
            table_fallback: config.roll_call.table_fallback,
        })
    }

    /// Members listed after the header signature. Each non-blank line is
    /// either a bare name (held until its vote line arrives) or a line of at
    /// least four tab-separated cells; anything else is skipped.
    ///
    /// Cells are counted before trimming, so empty leading or trailing vote
    /// cells (`"за\t\t\t"`) still make a data line.
    pub fn extract_from_text(&self, text: &str) -> Vec<MemberVote> {
        if self.header_columns.is_empty() {
            return Vec::new();
        }
        let Some(header) = self.header_pattern.find(text) else {
            return Vec::new();
        };

        let mut members = Vec::new();
        let mut pending_name: Option<String> = None;

        for line in text[header.end()..].split('\n') {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if NAME_ONLY_PATTERN.is_match(trimmed) {
                pending_name = Some(trimmed.to_string());
                continue;
            }

            let cells: Vec<&str> = line
                .trim_matches(|c: char| c == ' ' || c == '\r')
                .split('\t')
                .map(str::trim)
                .collect();
            if cells.len() < 4 {
                continue;
            }

            let member = match pending_name.take() {
                Some(full_name) => MemberVote {
                    full_name,
                    in_favor: cells[0].to_string(),
                    against: cells[1].to_string(),
                    abstain: cells[2].to_string(),
                    note: cells[3].to_string(),
                },
                None => MemberVote {
                    full_name: cells[0].to_string(),
                    in_favor: cells[1].to_string(),
                    against: cells[2].to_string(),
                    abstain: cells[3].to_string(),
                    note: cells.get(4).map(|c| c.to_string()).unwrap_or_default(),
                },
            };
            members.push(member);
        }

        members
    }

    fn is_header_row(&self, table: &Table) -> bool {
        !self.header_columns.is_empty()
            && self
                .header_columns
                .iter()
                .enumerate()
                .all(|(col, label)| table.cell(0, col).to_lowercase() == label.to_lowercase())
    }

    /// Rows of the last table whose first row is the roll-call header.
    /// Short rows read as empty cells; rows with no values at all are dropped.
    pub fn extract_from_tables(&self, tables: &[Table]) -> Vec<MemberVote> {
        let Some(table) = tables.iter().rev().find(|t| self.is_header_row(t)) else {
            return Vec::new();
        };

        (1..table.rows.len())
            .map(|row| MemberVote {
                full_name: table.cell(row, 0).to_string(),
                in_favor: table.cell(row, 1).to_string(),
                against: table.cell(row, 2).to_string(),
                abstain: table.cell(row, 3).to_string(),
                note: table.cell(row, 4).to_string(),
            })
            .filter(|member| {
                ![
                    &member.full_name,
                    &member.in_favor,
                    &member.against,
                    &member.abstain,
                    &member.note,
                ]
                .iter()
                .all(|value| value.is_empty())
            })
            .collect()
    }

    pub fn extract_roll_call(&self, document: &SourceDocument, text: &str) -> Vec<MemberVote> {
        let members = if self.from_text {
            self.extract_from_text(text)
        } else {
            Vec::new()
        };

        if members.is_empty() && self.table_fallback {
            let from_tables = self.extract_from_tables(&document.tables);
            debug!("   📋 Roll call from tables: {} members", from_tables.len());
            return from_tables;
        }

        members
    }
}

impl ExtractionRule for RollCallExtractor {
    type Output = Vec<MemberVote>;

    fn extract(&self, document: &SourceDocument, text: &str) -> Vec<MemberVote> {
        self.extract_roll_call(document, text)
    }

    fn name(&self) -> &str {
        "RollCall"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RollCallExtractor {
        RollCallExtractor::new(&ParsingConfig::default()).unwrap()
    }

    fn vote(name: &str, yes: &str, no: &str, abstain: &str, note: &str) -> MemberVote {
        MemberVote {
            full_name: name.into(),
            in_favor: yes.into(),
            against: no.into(),
            abstain: abstain.into(),
            note: note.into(),
        }
    }

    #[test]
    fn name_line_then_vote_line() {
        let text = "ПІБ за проти утримались примітка\n\
            Іванов Іван Іванович\n\
            за\tпроти\tутрим.\tприм.\n";
        assert_eq!(
            extractor().extract_from_text(text),
            vec![vote("Іванов Іван Іванович", "за", "проти", "утрим.", "прим.")]
        );
    }

    #[test]
    fn combined_line_needs_no_pending_name() {
        let text = "ПІБ  за\tпроти утримались\nпримітка\n\
            Петренко П.П.\tза\t-\t-\tвідсутній з поважних\n\
            Коваль О.І.\t-\tза\t-\n";
        assert_eq!(
            extractor().extract_from_text(text),
            vec![
                vote("Петренко П.П.", "за", "-", "-", "відсутній з поважних"),
                vote("Коваль О.І.", "-", "за", "-", ""),
            ]
        );
    }

    #[test]
    fn unmatched_lines_are_skipped() {
        let text = "ПІБ за проти утримались примітка\n\
            \n\
            Підписи членів комітету\n\
            Іванов Іван Іванович\n\
            за\tпроти\n\
            за\t\t\tнема\n";
        // the short line is skipped, the pending name survives it
        assert_eq!(
            extractor().extract_from_text(text),
            vec![vote("Іванов Іван Іванович", "за", "", "", "нема")]
        );
    }

    #[test]
    fn empty_trailing_vote_cells_still_count() {
        let text = "ПІБ за проти утримались примітка\n\
            Іванов І.І.\tза\t\t\t\n\
            Коваль О.І.\t-\tза\t-\tонлайн\r\n";
        assert_eq!(
            extractor().extract_from_text(text),
            vec![
                vote("Іванов І.І.", "за", "", "", ""),
                vote("Коваль О.І.", "-", "за", "-", "онлайн"),
            ]
        );
    }

    #[test]
    fn pending_name_takes_sparse_vote_line() {
        let text = "ПІБ за проти утримались примітка\n\
            Іванов Іван Іванович\n\
            за\t\t\t\n\
            Петренко П.П.\t-\tза\t-\tприм\n";
        assert_eq!(
            extractor().extract_from_text(text),
            vec![
                vote("Іванов Іван Іванович", "за", "", "", ""),
                vote("Петренко П.П.", "-", "за", "-", "прим"),
            ]
        );
    }

    #[test]
    fn missing_header_yields_nothing() {
        let text = "Іванов Іван Іванович\nза\tпроти\tутрим.\tприм.";
        assert!(extractor().extract_from_text(text).is_empty());
    }

    #[test]
    fn table_fallback_reads_last_matching_table() {
        let header: Vec<String> = ["ПІБ", "за", "проти", "утримались", "примітка"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let roll_call = Table::new(vec![
            header,
            vec!["Іванов І.І.".into(), "за".into()],
            vec!["".into(), "".into()],
        ]);
        let document = SourceDocument::new(
            vec!["Без таблиці в тексті".into()],
            vec![Table::new(vec![vec!["Голова комітету:".into()]]), roll_call],
        );

        assert_eq!(
            extractor().extract_roll_call(&document, &document.text()),
            vec![vote("Іванов І.І.", "за", "", "", "")]
        );

        let mut config = ParsingConfig::default();
        config.roll_call.table_fallback = false;
        assert!(RollCallExtractor::new(&config)
            .unwrap()
            .extract_roll_call(&document, &document.text())
            .is_empty());
    }
}
