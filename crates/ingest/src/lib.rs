//! Ingestion for reconciliation runs: bank statement text on one side,
//! extractor-produced broker ledger tables on the other. Both emit the
//! canonical row model from `concord-core`.

pub mod bank;
pub mod broker;
pub mod refrules;
pub mod text;

pub use bank::{parse_statement, BankParseOptions, BankStatement, DEFAULT_NOISE_MARKERS};
pub use broker::{
    embedded_reference, ingest_document, load_document, ExtractedDocument, ExtractedPage,
    ExtractedTable, LedgerError,
};
pub use refrules::{RefRule, RefRuleEngine, RuleHit, DEFAULT_RULES};
