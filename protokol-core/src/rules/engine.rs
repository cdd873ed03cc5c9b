use crate::config::ParsingConfig;
use crate::error::ProtocolResult;
use crate::types::*;
use std::time::{Duration, Instant};
use tracing::debug;

use super::agenda::AgendaSplitter;
use super::identity::IdentityExtractor;
use super::metadata::MetadataExtractor;
use super::roll_call::RollCallExtractor;

/// One extraction stage over a document. Stages never fail on missing or
/// malformed content; they return their empty output instead.
pub trait ExtractionRule {
    type Output;

    /// `text` is `document.text()`, computed once by the engine.
    fn extract(&self, document: &SourceDocument, text: &str) -> Self::Output;
    fn name(&self) -> &str;
}

/// Wall time spent in each rule for one document, in execution order.
pub type RuleTimings = Vec<(String, Duration)>;

pub struct RuleEngine {
    metadata: MetadataExtractor,
    identity: IdentityExtractor,
    agenda: AgendaSplitter,
    roll_call: RollCallExtractor,
}

impl RuleEngine {
    /// Compiles every label pattern up front; an unusable label in a custom
    /// config is reported here rather than per document.
    pub fn new(config: &ParsingConfig) -> ProtocolResult<Self> {
        Ok(Self {
            metadata: MetadataExtractor::new(config),
            identity: IdentityExtractor::new(config)?,
            agenda: AgendaSplitter::new(config)?,
            roll_call: RollCallExtractor::new(config)?,
        })
    }

    pub fn extract(&self, document: &SourceDocument) -> ProtocolRecord {
        self.extract_timed(document).0
    }

    pub fn extract_timed(&self, document: &SourceDocument) -> (ProtocolRecord, RuleTimings) {
        let text = document.text();
        let mut timings = RuleTimings::new();

        let meeting = run_rule(&self.metadata, document, &text, &mut timings);
        let identity = run_rule(&self.identity, document, &text, &mut timings);
        let agenda = run_rule(&self.agenda, document, &text, &mut timings);
        let roll_call = run_rule(&self.roll_call, document, &text, &mut timings);

        debug!(
            "   ✅ {} agenda items, {} members, protocol №{:?}",
            agenda.len(),
            roll_call.len(),
            identity.number
        );

        let record = ProtocolRecord {
            meeting,
            identity,
            agenda,
            roll_call,
        };
        (record, timings)
    }
}

fn run_rule<R: ExtractionRule>(
    rule: &R,
    document: &SourceDocument,
    text: &str,
    timings: &mut RuleTimings,
) -> R::Output {
    let rule_start = Instant::now();
    let output = rule.extract(document, text);
    let elapsed = rule_start.elapsed();
    debug!("🔧 {} took {:.2?}", rule.name(), elapsed);
    timings.push((rule.name().to_string(), elapsed));
    output
}
