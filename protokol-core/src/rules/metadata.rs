use super::anchors::{block_values, inline_value, table_values};
use super::engine::ExtractionRule;
use crate::config::{ExtractionStrategy, FieldRule, ParsingConfig};
use crate::types::*;
use tracing::debug;

/// Meeting-level fields (roles, quorum, procedure) driven by the rule table.
pub struct MetadataExtractor {
    rules: Vec<FieldRule>,
}

impl MetadataExtractor {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            rules: config.meeting_fields.clone(),
        }
    }

    /// Fields without a matching label stay at their empty default; nothing
    /// here can fail.
    pub fn extract_meeting_info(&self, text: &str, header_table: Option<&Table>) -> MeetingInfo {
        let mut info = MeetingInfo::default();

        for rule in &self.rules {
            let value = self.extract_field(rule, text, header_table);
            debug!("   🏷️  {:?} ({:?}) -> {:?}", rule.field, rule.strategy, value);
            info.set(rule.field, value);
        }

        info
    }

    fn extract_field(&self, rule: &FieldRule, text: &str, header_table: Option<&Table>) -> MeetingValue {
        match (rule.strategy, header_table) {
            (ExtractionStrategy::Inline, _) => MeetingValue::Text(inline_value(text, &rule.label)),
            (ExtractionStrategy::HeaderTable, Some(table)) => {
                MeetingValue::List(table_values(table, &rule.label))
            }
            (ExtractionStrategy::Block, _) | (ExtractionStrategy::HeaderTable, None) => {
                MeetingValue::List(block_values(text, &rule.label))
            }
        }
    }
}

impl ExtractionRule for MetadataExtractor {
    type Output = MeetingInfo;

    fn extract(&self, document: &SourceDocument, text: &str) -> MeetingInfo {
        self.extract_meeting_info(text, document.first_table())
    }

    fn name(&self) -> &str {
        "MeetingMetadata"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_table() -> Table {
        let rows: &[&[&str]] = &[
            &["Голова комітету:", ""],
            &["Іванов Іван Іванович", ""],
            &["Заступник Голови комітету:", ""],
            &["Петренко Петро Петрович", ""],
            &["Члени комітету:", ""],
            &["Сидоренко Сидір Сидорович", "Коваль Олена Іванівна"],
            &["Шевченко Тарас Григорович"],
            &["Секретар комітету (без права голосу):", ""],
            &["Мельник Ольга Петрівна", ""],
        ];
        Table::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    const TEXT: &str = "ПРОТОКОЛ № 3\n\
        Відсутні: Бондар Б.Б.\n\
        Запрошені: Гнатюк Г.Г., Лисенко Л.Л.\n\
        Кворум: є\n\
        Порядок прийняття рішень: більшістю голосів\n";

    #[test]
    fn header_table_variant_reads_roles_from_first_table() {
        let extractor = MetadataExtractor::new(&ParsingConfig::default());
        let info = extractor.extract_meeting_info(TEXT, Some(&header_table()));

        assert_eq!(info.text(MeetingField::Chair), "Іванов Іван Іванович");
        assert_eq!(info.text(MeetingField::DeputyChair), "Петренко Петро Петрович");
        assert_eq!(info.text(MeetingField::Secretary), "Мельник Ольга Петрівна");
        assert_eq!(
            info.list(MeetingField::Members),
            vec![
                "Сидоренко Сидір Сидорович",
                "Коваль Олена Іванівна",
                "Шевченко Тарас Григорович"
            ]
        );
        assert_eq!(info.text(MeetingField::Absentees), "Бондар Б.Б.");
        assert_eq!(info.text(MeetingField::Invitees), "Гнатюк Г.Г., Лисенко Л.Л.");
        assert_eq!(info.text(MeetingField::Quorum), "є");
        assert_eq!(info.text(MeetingField::DecisionProcedure), "більшістю голосів");
    }

    #[test]
    fn header_table_variant_falls_back_to_text_without_tables() {
        let text = "Голова комітету: Іванов Іван Іванович\n\
            Члени комітету:\n\
            Сидоренко Сидір Сидорович\n\
            Коваль Олена Іванівна\n\
            \n\
            Кворум: є";
        let extractor = MetadataExtractor::new(&ParsingConfig::default());
        let info = extractor.extract_meeting_info(text, None);

        assert_eq!(info.text(MeetingField::Chair), "Іванов Іван Іванович");
        assert_eq!(
            info.list(MeetingField::Members),
            vec!["Сидоренко Сидір Сидорович", "Коваль Олена Іванівна"]
        );
    }

    #[test]
    fn missing_labels_yield_empty_values_not_missing_keys() {
        let extractor = MetadataExtractor::new(&ParsingConfig::plain_text());
        let info = extractor.extract_meeting_info("зовсім інший документ", None);
        for field in MeetingField::ALL {
            assert_eq!(info.text(field), "", "{field:?} should be empty");
        }
    }

    #[test]
    fn fields_without_rules_still_present() {
        let mut config = ParsingConfig::default();
        config.meeting_fields.retain(|r| r.field == MeetingField::Quorum);
        let info = MetadataExtractor::new(&config).extract_meeting_info(TEXT, None);
        assert_eq!(info.text(MeetingField::Quorum), "є");
        assert_eq!(info.list(MeetingField::Members), Vec::<String>::new());
    }
}
