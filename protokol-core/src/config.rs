use crate::types::MeetingField;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use tracing::warn;

// Default value functions for serde
fn default_true() -> bool {
    true
}

/// Template flavours seen in the wild. Each maps to a built-in rule table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateVariant {
    /// Committee roles listed in a header table at the top of the document
    HeaderTable,
    /// Committee roles typed as plain paragraphs under their labels
    PlainText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub variant: TemplateVariant,
    #[serde(default)]
    pub labels: LabelTable,
    /// Meeting-level fields, in extraction order
    #[serde(default = "default_meeting_fields")]
    pub meeting_fields: Vec<FieldRule>,
    #[serde(default)]
    pub roll_call: RollCallConfig,
    #[serde(default)]
    pub flatten: FlattenConfig,
}

/// How a meeting field's value is located relative to its label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Rest of the label's line
    Inline,
    /// Rest of the label's line plus following lines, up to a blank line or
    /// a line containing a colon
    Block,
    /// Cells under the label in the document's first table; `Block` when the
    /// document has no tables
    HeaderTable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldRule {
    pub field: MeetingField,
    /// Literal label text, matched verbatim (no regex syntax)
    pub label: String,
    pub strategy: ExtractionStrategy,
}

impl FieldRule {
    pub fn new(field: MeetingField, label: &str, strategy: ExtractionStrategy) -> Self {
        Self {
            field,
            label: label.to_string(),
            strategy,
        }
    }
}

fn default_meeting_fields() -> Vec<FieldRule> {
    meeting_fields_for(ExtractionStrategy::HeaderTable)
}

fn meeting_fields_for(role_strategy: ExtractionStrategy) -> Vec<FieldRule> {
    use ExtractionStrategy::Inline;
    vec![
        FieldRule::new(MeetingField::Chair, "Голова комітету:", role_strategy),
        FieldRule::new(
            MeetingField::DeputyChair,
            "Заступник Голови комітету:",
            role_strategy,
        ),
        FieldRule::new(
            MeetingField::Secretary,
            "Секретар комітету (без права голосу):",
            role_strategy,
        ),
        FieldRule::new(MeetingField::Members, "Члени комітету:", role_strategy),
        FieldRule::new(MeetingField::Absentees, "Відсутні:", Inline),
        FieldRule::new(MeetingField::Invitees, "Запрошені:", Inline),
        FieldRule::new(MeetingField::Quorum, "Кворум:", Inline),
        FieldRule::new(
            MeetingField::DecisionProcedure,
            "Порядок прийняття рішень:",
            Inline,
        ),
    ]
}

/// Fixed keyword anchors of the protocol template. Keys left out of a YAML
/// file keep their built-in value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LabelTable {
    /// Introduces the agenda title list
    pub agenda: String,
    /// Question marker keyword, followed by a number and a colon
    pub question: String,
    pub speaker: String,
    pub voted: String,
    pub decided: String,
    /// Stops the last question block (start of the roll-call table)
    pub block_terminator: String,
    pub vote_choices: VoteChoiceLabels,
    /// Heading word in front of the protocol number
    pub protocol_heading: String,
    /// Word that follows the year in the date line
    pub year_word: String,
    /// Roll-call table header, one entry per column
    pub roll_call_header: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VoteChoiceLabels {
    #[serde(rename = "for")]
    pub in_favor: String,
    pub against: String,
    pub abstain: String,
}

impl Default for VoteChoiceLabels {
    fn default() -> Self {
        Self {
            in_favor: "за".to_string(),
            against: "проти".to_string(),
            abstain: "утримались".to_string(),
        }
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self {
            agenda: "ПОРЯДОК ДЕННИЙ:".to_string(),
            question: "Питання".to_string(),
            speaker: "Виступив:".to_string(),
            voted: "Голосували:".to_string(),
            decided: "Вирішили:".to_string(),
            block_terminator: "ПІБ".to_string(),
            vote_choices: VoteChoiceLabels::default(),
            protocol_heading: "ПРОТОКОЛ".to_string(),
            year_word: "року".to_string(),
            roll_call_header: ["ПІБ", "за", "проти", "утримались", "примітка"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollCallConfig {
    /// Read the roll call from the text stream (tab-separated lines)
    #[serde(default = "default_true")]
    pub from_text: bool,
    /// When the text yields nothing, read the last table whose header row
    /// matches the roll-call header. Roll calls laid out as a Word table
    /// never reach the text stream, so this is on unless disabled.
    #[serde(default = "default_true")]
    pub table_fallback: bool,
}

impl Default for RollCallConfig {
    fn default() -> Self {
        Self {
            from_text: true,
            table_fallback: true,
        }
    }
}

/// What to emit for an agenda item when the roll call is empty
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRollCallPolicy {
    /// One row per agenda item with blank member columns
    #[default]
    Placeholder,
    /// No rows at all (strict agenda × members product)
    Omit,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlattenConfig {
    #[serde(default)]
    pub empty_roll_call: EmptyRollCallPolicy,
    /// Also write each continuation row's member name into the members
    /// column, the layout of the older hand-made sheets
    #[serde(default)]
    pub member_name_in_members: bool,
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    configs: HashMap<TemplateVariant, ParsingConfig>,
    default_config: ParsingConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        configs.insert(TemplateVariant::HeaderTable, ParsingConfig::default());
        configs.insert(TemplateVariant::PlainText, ParsingConfig::plain_text());

        Self {
            configs,
            default_config: ParsingConfig::default(),
        }
    }

    pub fn get_config(&self, variant: TemplateVariant) -> &ParsingConfig {
        self.configs.get(&variant).unwrap_or(&self.default_config)
    }

    /// Register a YAML config, replacing the built-in one for its variant
    pub fn load_config_from_file(&mut self, path: &str) -> Result<()> {
        let config = ParsingConfig::load_from_file(path)?;
        self.configs.insert(config.variant, config);
        Ok(())
    }

    pub fn variants(&self) -> Vec<TemplateVariant> {
        let mut variants: Vec<_> = self.configs.keys().copied().collect();
        variants.sort_by_key(|v| *v as u8);
        variants
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsingConfig {
    /// Roles typed as paragraphs rather than laid out in a table
    pub fn plain_text() -> Self {
        Self {
            variant: TemplateVariant::PlainText,
            meeting_fields: meeting_fields_for(ExtractionStrategy::Block),
            ..Self::default()
        }
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ParsingConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("⚠️  Failed to load config from {}: {}, using defaults", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Every meeting field that has no rule gets an empty value; this reports
    /// which fields the table leaves uncovered
    pub fn uncovered_fields(&self) -> Vec<MeetingField> {
        MeetingField::ALL
            .iter()
            .copied()
            .filter(|field| !self.meeting_fields.iter().any(|rule| rule.field == *field))
            .collect()
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            variant: TemplateVariant::HeaderTable,
            labels: LabelTable::default(),
            meeting_fields: default_meeting_fields(),
            roll_call: RollCallConfig::default(),
            flatten: FlattenConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_meeting_field() {
        assert!(ParsingConfig::default().uncovered_fields().is_empty());
        assert!(ParsingConfig::plain_text().uncovered_fields().is_empty());
    }

    #[test]
    fn yaml_overrides_keep_defaults_for_missing_sections() {
        let yaml = r#"
variant: plain-text
flatten:
  empty_roll_call: omit
meeting_fields:
  - field: quorum
    label: "Кворум є:"
    strategy: inline
"#;
        let config = ParsingConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.variant, TemplateVariant::PlainText);
        assert_eq!(config.flatten.empty_roll_call, EmptyRollCallPolicy::Omit);
        assert_eq!(config.labels, LabelTable::default());
        assert_eq!(config.meeting_fields.len(), 1);
        assert_eq!(config.uncovered_fields().len(), 7);
        assert!(config.roll_call.from_text);
        assert!(config.roll_call.table_fallback);
    }

    #[test]
    fn partial_labels_keep_remaining_defaults() {
        let yaml = r#"
variant: header-table
labels:
  speaker: "Доповідач:"
  vote_choices:
    abstain: "утрималось"
"#;
        let config = ParsingConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.labels.speaker, "Доповідач:");
        assert_eq!(config.labels.voted, "Голосували:");
        assert_eq!(config.labels.vote_choices.abstain, "утрималось");
        assert_eq!(config.labels.vote_choices.in_favor, "за");
    }

    #[test]
    fn bundled_configs_parse() {
        for yaml in [
            include_str!("../../configs/header-table.yaml"),
            include_str!("../../configs/plain-text.yaml"),
        ] {
            let config = ParsingConfig::from_yaml(yaml).unwrap();
            assert!(config.uncovered_fields().is_empty());
        }
    }

    #[test]
    fn manager_serves_builtin_variants() {
        let manager = ConfigManager::new();
        let plain = manager.get_config(TemplateVariant::PlainText);
        assert!(plain
            .meeting_fields
            .iter()
            .filter(|r| r.field == MeetingField::Members)
            .all(|r| r.strategy == ExtractionStrategy::Block));
        assert_eq!(
            manager.variants(),
            vec![TemplateVariant::HeaderTable, TemplateVariant::PlainText]
        );
    }
}
