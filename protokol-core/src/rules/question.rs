use crate::config::ParsingConfig;
use crate::error::ProtocolResult;
use crate::types::*;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockMarker {
    Speaker,
    Voted,
    Decided,
}

#[derive(Debug, Clone, Copy)]
struct BlockToken {
    marker: BlockMarker,
    start: usize,
    end: usize,
}

/// Speaker, vote tally and decision inside one question block.
///
/// Grammar over the block's markers:
/// - speaker: first `Виступив:` up to the next `Голосували:`
/// - votes: first `Голосували:` up to the next `Вирішили:`
/// - decision: last `Вирішили:` to the end of the block
///
/// Each part is optional and defaults to "".
pub struct QuestionParser {
    speaker: String,
    voted: String,
    decided: String,
    in_favor: Regex,
    against: Regex,
    abstain: Regex,
}

impl QuestionParser {
    pub fn new(config: &ParsingConfig) -> ProtocolResult<Self> {
        let labels = &config.labels;
        let choice = |word: &str| Regex::new(&format!(r"{}\s*-\s*(\S+)", regex::escape(word)));

        Ok(Self {
            speaker: labels.speaker.clone(),
            voted: labels.voted.clone(),
            decided: labels.decided.clone(),
            in_favor: choice(&labels.vote_choices.in_favor)?,
            against: choice(&labels.vote_choices.against)?,
            abstain: choice(&labels.vote_choices.abstain)?,
        })
    }

    fn tokenize(&self, block: &str) -> Vec<BlockToken> {
        let mut tokens = Vec::new();
        for (marker, label) in [
            (BlockMarker::Speaker, &self.speaker),
            (BlockMarker::Voted, &self.voted),
            (BlockMarker::Decided, &self.decided),
        ] {
            if label.is_empty() {
                continue;
            }
            for (start, _) in block.match_indices(label.as_str()) {
                tokens.push(BlockToken {
                    marker,
                    start,
                    end: start + label.len(),
                });
            }
        }
        tokens.sort_by_key(|t| t.start);
        tokens
    }

    /// Text between the first `open` marker and the first `close` marker after it
    fn span<'b>(
        block: &'b str,
        tokens: &[BlockToken],
        open: BlockMarker,
        close: BlockMarker,
    ) -> Option<&'b str> {
        let opening = tokens.iter().find(|t| t.marker == open)?;
        let closing = tokens
            .iter()
            .find(|t| t.marker == close && t.start >= opening.end)?;
        Some(&block[opening.end..closing.start])
    }

    fn choice_count(pattern: &Regex, span: &str) -> String {
        pattern
            .captures(span)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn parse_votes(&self, span: &str) -> VoteTally {
        VoteTally {
            in_favor: Self::choice_count(&self.in_favor, span),
            against: Self::choice_count(&self.against, span),
            abstain: Self::choice_count(&self.abstain, span),
        }
    }

    pub fn parse_block(&self, block: &str, title: String) -> AgendaItem {
        let tokens = self.tokenize(block);

        let speaker = Self::span(block, &tokens, BlockMarker::Speaker, BlockMarker::Voted)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let votes = Self::span(block, &tokens, BlockMarker::Voted, BlockMarker::Decided)
            .map(|s| self.parse_votes(s))
            .unwrap_or_default();

        let decision = tokens
            .iter()
            .rev()
            .find(|t| t.marker == BlockMarker::Decided)
            .map(|t| block[t.end..].trim().to_string())
            .unwrap_or_default();

        AgendaItem {
            text: title,
            speaker,
            votes,
            decision,
        }
    }
}
