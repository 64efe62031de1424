//! Broker ledger ingestion. The ledger arrives as tables lifted out of a
//! PDF by an external extractor: pages of tables of rows of string cells,
//! with header phrasing that shifts between statements. Column
//! identification is a declarative substring table evaluated in priority
//! order, so downstream code only ever sees canonical fields.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use concord_core::dates::parse_day_first;
use concord_core::money::parse_cell;
use concord_core::{Amount, BrokerTransaction, LedgerDate};

use crate::text::{clean_particulars, squash_spaces};

/// Extraction product of the external PDF table collaborator: every table
/// cell as text, page by page. Geometry is the extractor's problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub pages: Vec<ExtractedPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPage {
    #[serde(default)]
    pub number: u32,
    pub tables: Vec<ExtractedTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub rows: Vec<Vec<String>>,
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("no header row found in extracted tables")]
    HeaderRowNotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canonical fields a header label can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerField {
    Date,
    Particulars,
    Debit,
    Credit,
    Reference,
}

/// Label substring to field, evaluated top-down per label. Order matters:
/// a column headed "Reference Date" must land on `Date` before `Reference`
/// is even considered.
const HEADER_MAP: &[(&str, LedgerField)] = &[
    ("date", LedgerField::Date),
    ("transac", LedgerField::Date),
    ("particular", LedgerField::Particulars),
    ("debit", LedgerField::Debit),
    ("credit", LedgerField::Credit),
    ("ref", LedgerField::Reference),
];

#[derive(Debug, Clone, Default)]
struct ColumnMap {
    date: Option<usize>,
    particulars: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    reference: Option<usize>,
}

impl ColumnMap {
    /// The leftmost label claiming a field wins; later claimants are
    /// ignored rather than overwriting the mapping.
    fn from_header(cells: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (idx, cell) in cells.iter().enumerate() {
            let label = cell.to_lowercase();
            let field = HEADER_MAP
                .iter()
                .find(|(marker, _)| label.contains(marker))
                .map(|(_, field)| *field);
            let slot = match field {
                Some(LedgerField::Date) => &mut map.date,
                Some(LedgerField::Particulars) => &mut map.particulars,
                Some(LedgerField::Debit) => &mut map.debit,
                Some(LedgerField::Credit) => &mut map.credit,
                Some(LedgerField::Reference) => &mut map.reference,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(idx);
            }
        }
        map
    }
}

fn is_header_row(cells: &[String]) -> bool {
    let joined = cells.join(" ").to_lowercase();
    joined.contains("particulars") && (joined.contains("debit") || joined.contains("credit"))
}

/// "Reference No.: 478322208", "Ref No - CZ123" and the like, buried in
/// the particulars text. The separator is optional but something must
/// stand between "No" and the token, or "Note 5" would match.
fn embedded_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Ref(?:erence)?\.?\s*No(?:\.|\b)\s*[:\-]?\s*(\w+)")
            .expect("invalid regex")
    })
}

pub fn embedded_reference(particulars: &str) -> Option<String> {
    embedded_ref_re()
        .captures(particulars)
        .map(|caps| caps[1].to_string())
}

/// Reads the extractor's JSON output from disk.
pub fn load_document(path: &Path) -> Result<ExtractedDocument, LedgerError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Flattens all pages into one row stream, locates the header, and converts
/// every data row after it. Rows before the header are discarded; header
/// repeats on later pages are skipped.
pub fn ingest_document(doc: &ExtractedDocument) -> Result<Vec<BrokerTransaction>, LedgerError> {
    let mut columns: Option<ColumnMap> = None;
    let mut out: Vec<BrokerTransaction> = Vec::new();

    for page in &doc.pages {
        for table in &page.tables {
            for raw in &table.rows {
                // Cells may carry embedded newlines from the extractor.
                let cells: Vec<String> = raw.iter().map(|c| squash_spaces(c)).collect();
                match &columns {
                    None => {
                        if is_header_row(&cells) {
                            debug!(page = page.number, "ledger header row located");
                            columns = Some(ColumnMap::from_header(&cells));
                        }
                    }
                    Some(map) => {
                        if is_header_row(&cells) {
                            continue;
                        }
                        if let Some(tx) = convert_row(&cells, map, out.len()) {
                            out.push(tx);
                        }
                    }
                }
            }
        }
    }

    match columns {
        Some(_) => Ok(out),
        None => Err(LedgerError::HeaderRowNotFound),
    }
}

fn convert_row(cells: &[String], map: &ColumnMap, row: usize) -> Option<BrokerTransaction> {
    let cell = |slot: Option<usize>| {
        slot.and_then(|i| cells.get(i))
            .map(String::as_str)
            .unwrap_or("")
    };

    let particulars = clean_particulars(cell(map.particulars));
    if particulars.is_empty() {
        return None;
    }

    // Missing or unparseable amount cells degrade to zero, never fail the
    // row; a row moving no money at all is table noise and drops out.
    let credit = parse_cell(cell(map.credit)).unwrap_or_else(Amount::zero);
    let debit = parse_cell(cell(map.debit)).unwrap_or_else(Amount::zero);
    if credit.is_zero() && debit.is_zero() {
        return None;
    }

    let raw_date = cell(map.date).trim();
    let date = if raw_date.is_empty() {
        LedgerDate::Missing
    } else {
        match parse_day_first(raw_date) {
            Some(day) => LedgerDate::Day(day),
            None => {
                debug!(cell = raw_date, "ledger date cell did not parse day-first");
                LedgerDate::Unparsed(raw_date.to_string())
            }
        }
    };

    let explicit = cell(map.reference).trim();
    let reference = if explicit.is_empty() {
        embedded_reference(&particulars)
    } else {
        Some(explicit.to_string())
    };

    Some(BrokerTransaction {
        row,
        date,
        reference,
        credit,
        debit,
        particulars,
        settlement_date: None,
    })
}
