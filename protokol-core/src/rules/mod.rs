// Extraction rules. Each stage reads the document text (and tables where the
// template puts data in them) and returns its part of a `ProtocolRecord`:
// - anchors.rs: label-anchored value lookups
// - metadata.rs: meeting roles, quorum, decision procedure
// - identity.rs: protocol number and date
// - agenda.rs: agenda titles and question blocks
// - question.rs: speaker, votes, decision inside one block
// - roll_call.rs: per-member votes
// - engine.rs: RuleEngine running the stages in order

pub mod agenda;
pub mod anchors;
pub mod engine;
pub mod identity;
pub mod metadata;
pub mod question;
pub mod roll_call;

pub use engine::*;
