use super::engine::ExtractionRule;
use super::question::QuestionParser;
use crate::config::ParsingConfig;
use crate::error::ProtocolResult;
use crate::types::*;
use regex::Regex;

/// Section marker found in the body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    Agenda,
    /// "Питання N:"
    Question(u32),
    /// Start of the roll-call table; closes the last question
    Terminator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Byte offset of the marker's first character
    pub start: usize,
    /// Byte offset just past the marker
    pub end: usize,
}

/// Raw text of one question, before field parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    pub number: u32,
    pub body: String,
}

impl QuestionBlock {
    /// First non-empty line, used when the agenda list runs out of titles
    pub fn first_line(&self) -> String {
        self.body
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
            .to_string()
    }
}

/// Tokenizes the body into section markers and cuts question blocks.
pub struct AgendaSplitter {
    agenda_label: String,
    terminator: String,
    question_pattern: Regex,
    question_parser: QuestionParser,
}

impl AgendaSplitter {
    pub fn new(config: &ParsingConfig) -> ProtocolResult<Self> {
        let labels = &config.labels;
        let question_pattern =
            Regex::new(&format!(r"{}\s*([0-9]+):", regex::escape(&labels.question)))?;

        Ok(Self {
            agenda_label: labels.agenda.clone(),
            terminator: labels.block_terminator.clone(),
            question_pattern,
            question_parser: QuestionParser::new(config)?,
        })
    }

    /// All markers in document order
    pub fn tokenize(&self, text: &str) -> Vec<Marker> {
        let mut markers = Vec::new();

        if let Some(start) = find_label(text, &self.agenda_label, 0) {
            markers.push(Marker {
                kind: MarkerKind::Agenda,
                start,
                end: start + self.agenda_label.len(),
            });
        }

        for caps in self.question_pattern.captures_iter(text) {
            let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            markers.push(Marker {
                kind: MarkerKind::Question(number.as_str().parse().unwrap_or(0)),
                start: whole.start(),
                end: whole.end(),
            });
        }

        let mut from = 0;
        while let Some(start) = find_label(text, &self.terminator, from) {
            let end = start + self.terminator.len();
            markers.push(Marker {
                kind: MarkerKind::Terminator,
                start,
                end,
            });
            from = end;
        }

        markers.sort_by_key(|m| m.start);
        markers
    }

    /// One block per question marker, running to the next question marker,
    /// the terminator, or the end of the text
    pub fn split_blocks(&self, text: &str) -> Vec<QuestionBlock> {
        let markers = self.tokenize(text);
        let mut blocks = Vec::new();

        for (index, marker) in markers.iter().enumerate() {
            let MarkerKind::Question(number) = marker.kind else {
                continue;
            };
            let end = markers[index + 1..]
                .iter()
                .find(|next| {
                    next.start >= marker.end
                        && matches!(next.kind, MarkerKind::Question(_) | MarkerKind::Terminator)
                })
                .map(|next| next.start)
                .unwrap_or(text.len());

            blocks.push(QuestionBlock {
                number,
                body: text[marker.end..end].to_string(),
            });
        }

        blocks
    }

    /// Titles listed between the agenda label and the first question marker.
    /// Lines are trimmed of spaces, dots and tabs; blank lines are dropped.
    pub fn agenda_titles(&self, text: &str) -> Vec<String> {
        let markers = self.tokenize(text);
        let Some(agenda) = markers.iter().find(|m| m.kind == MarkerKind::Agenda) else {
            return Vec::new();
        };
        let end = markers
            .iter()
            .find(|m| m.start >= agenda.end && matches!(m.kind, MarkerKind::Question(_)))
            .map(|m| m.start)
            .unwrap_or(text.len());

        text[agenda.end..end]
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.trim_matches(|c: char| c == ' ' || c == '.' || c == '\t').to_string())
            .collect()
    }

    /// Agenda items in document order. The n-th item takes the n-th agenda
    /// title, or its block's first line once the titles run out.
    pub fn extract_agenda(&self, text: &str) -> Vec<AgendaItem> {
        let titles = self.agenda_titles(text);

        self.split_blocks(text)
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let title = titles
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| block.first_line());
                self.question_parser.parse_block(&block.body, title)
            })
            .collect()
    }
}

fn find_label(text: &str, label: &str, from: usize) -> Option<usize> {
    if label.is_empty() || from > text.len() {
        return None;
    }
    text[from..].find(label).map(|offset| from + offset)
}

impl ExtractionRule for AgendaSplitter {
    type Output = Vec<AgendaItem>;

    fn extract(&self, _document: &SourceDocument, text: &str) -> Vec<AgendaItem> {
        self.extract_agenda(text)
    }

    fn name(&self) -> &str {
        "AgendaQuestions"
    }
}
