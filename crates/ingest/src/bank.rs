//! Bank statement ingestion. Statement dumps arrive as ragged text: one
//! logical transaction spans a variable number of physical lines, wrapped
//! and interleaved with footer boilerplate. Segmentation recovers the
//! transaction blocks; token scanning recovers the fields.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use concord_core::dates::parse_day_first;
use concord_core::money::{parse_token, Amount};
use concord_core::{BankTransaction, ExceptionCode, ExceptionRecord};

use crate::refrules::RefRuleEngine;

/// Footer and legend markers observed across the supported statement
/// layouts. Lines containing any of these (case-insensitive) are dropped
/// before segmentation.
pub const DEFAULT_NOISE_MARKERS: &[&str] = &[
    "collect",
    "date summary",
    "dr count",
    "cr count",
    "branch,",
    "continued page",
];

/// A block-start line is a row index number followed by a day-first date.
fn block_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\s+\d{2}/\d{2}/\d{4}\b").expect("invalid regex"))
}

#[derive(Debug, Clone)]
pub struct BankParseOptions {
    pub noise_markers: Vec<String>,
}

impl Default for BankParseOptions {
    fn default() -> Self {
        Self {
            noise_markers: DEFAULT_NOISE_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Parsed statement plus the data-integrity observations raised on the way.
#[derive(Debug, Clone)]
pub struct BankStatement {
    pub transactions: Vec<BankTransaction>,
    pub exceptions: Vec<ExceptionRecord>,
}

pub fn parse_statement(text: &str, options: &BankParseOptions) -> BankStatement {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_noise(trimmed, &options.noise_markers) {
            continue;
        }
        if block_start_re().is_match(trimmed) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            current = Some(vec![trimmed]);
        } else if let Some(block) = current.as_mut() {
            // Continuation of the open block. Lines before the first
            // block-start have no home and are discarded.
            block.push(trimmed);
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }

    let rules = RefRuleEngine::default();
    let mut transactions: Vec<BankTransaction> = Vec::new();
    let mut exceptions = Vec::new();

    for block in &blocks {
        let row = transactions.len();
        match parse_block(block, row, &rules) {
            Some(tx) => {
                if tx.needs_review {
                    exceptions.push(ExceptionRecord::new(
                        ExceptionCode::DataIntegrity,
                        format!("no usable amount token in block '{}'; amount set to 0", block[0]),
                        (!tx.reference.is_empty()).then(|| tx.reference.clone()),
                        None,
                    ));
                }
                transactions.push(tx);
            }
            None => {
                warn!(line = block[0], "dropping statement block with unparseable date");
            }
        }
    }

    BankStatement { transactions, exceptions }
}

fn is_noise(line: &str, markers: &[String]) -> bool {
    let lower = line.to_lowercase();
    markers.iter().any(|m| lower.contains(&m.to_lowercase()))
}

fn parse_block(lines: &[&str], row: usize, rules: &RefRuleEngine) -> Option<BankTransaction> {
    let joined = lines.join(" ");
    let tokens: Vec<&str> = joined.split_whitespace().collect();

    // The leading row index and the date are structural, not data.
    let date = parse_day_first(tokens.get(1)?)?;

    let mut amounts: Vec<Amount> = Vec::new();
    let mut others: Vec<String> = Vec::new();
    for token in &tokens[2..] {
        match parse_token(token) {
            Some(amount) => amounts.push(amount),
            None => others.push((*token).to_string()),
        }
    }

    let amount = amounts.iter().copied().find(|a| !a.is_negligible());

    let context = others.join(" ").to_lowercase();
    let reference = rules.extract(&others, &context);

    let narration = match &reference {
        Some((ref_index, _)) => others
            .iter()
            .enumerate()
            .filter(|(i, _)| i != ref_index)
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        None => others.join(" "),
    };

    Some(BankTransaction {
        row,
        date,
        amount: amount.unwrap_or_else(Amount::zero),
        reference: reference.map(|(_, value)| value).unwrap_or_default(),
        narration,
        source_line: joined,
        needs_review: amount.is_none(),
    })
}
