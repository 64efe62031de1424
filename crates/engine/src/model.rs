//! Result shapes a reconciliation run hands to the export layer. Column
//! orderings here are stable; downstream consumers depend on them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use concord_core::{Amount, ExceptionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchKind {
    Exact,
    AmountOnly,
    Fuzzy,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "EXACT"),
            MatchKind::AmountOnly => write!(f, "AMOUNT_ONLY"),
            MatchKind::Fuzzy => write!(f, "FUZZY"),
        }
    }
}

/// One accepted bank-to-broker assignment. `delta` is signed bank minus
/// broker and is retained even when zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub kind: MatchKind,
    pub bank_row: usize,
    pub broker_row: usize,
    /// Bank-side transaction date.
    pub date: NaiveDate,
    pub bank_amount: Amount,
    pub broker_credit: Amount,
    pub delta: Amount,
    pub bank_reference: String,
    pub broker_reference: Option<String>,
}

/// Exactly one per bank transaction, in statement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    Exact(MatchRecord),
    AmountOnly(MatchRecord),
    Fuzzy(MatchRecord),
    Unmatched { bank_row: usize, reason: String },
}

impl MatchOutcome {
    pub fn record(&self) -> Option<&MatchRecord> {
        match self {
            MatchOutcome::Exact(r) | MatchOutcome::AmountOnly(r) | MatchOutcome::Fuzzy(r) => {
                Some(r)
            }
            MatchOutcome::Unmatched { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSide {
    Bank,
    Broker,
}

impl std::fmt::Display for RecordSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordSide::Bank => write!(f, "bank"),
            RecordSide::Broker => write!(f, "broker"),
        }
    }
}

/// A row on either side that no accepted match consumed. `date` renders
/// ISO for parsed dates, the raw cell text for unparsed ones, empty for
/// missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRecord {
    pub side: RecordSide,
    pub row: usize,
    pub date: String,
    pub reference: Option<String>,
    pub amount: Amount,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub bank_total: usize,
    pub broker_total: usize,
    pub matched: usize,
    pub partial: usize,
    pub unmatched_bank: usize,
    pub unmatched_broker: usize,
    pub exceptions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub engine_version: String,
    pub run_at: String,
}

/// Everything one run produces, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconReport {
    pub meta: RunMeta,
    pub summary: RunSummary,
    pub matched: Vec<MatchRecord>,
    pub partial: Vec<MatchRecord>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub exceptions: Vec<ExceptionRecord>,
}
