use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Amount;

/// Sentinel carried by canonical bank rows whose statement block yielded no
/// reference token. It never satisfies reference equality during matching.
pub const UNKNOWN_REF: &str = "unknown";

/// One credit entry recovered from a statement block, in statement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Zero-based position in the statement; stable row id for reports.
    pub row: usize,
    pub date: NaiveDate,
    /// Magnitude after normalization; direction is not modeled.
    pub amount: Amount,
    pub reference: String,
    pub narration: String,
    /// The block text as it appeared in the statement, for audit.
    pub source_line: String,
    /// Set when no usable amount token existed and zero was substituted.
    pub needs_review: bool,
}

impl BankTransaction {
    pub fn has_reference(&self) -> bool {
        !self.reference.is_empty() && self.reference != UNKNOWN_REF
    }
}

/// Date cell of a ledger row. Extraction sometimes yields text the day-first
/// parser cannot read; the raw text is kept for diagnostics, but such rows
/// never enter date-window candidacy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDate {
    Day(NaiveDate),
    Unparsed(String),
    Missing,
}

impl LedgerDate {
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            LedgerDate::Day(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerDate::Day(d) => write!(f, "{d}"),
            LedgerDate::Unparsed(raw) => write!(f, "{raw}"),
            LedgerDate::Missing => Ok(()),
        }
    }
}

/// One row accepted from the broker ledger extraction, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerTransaction {
    /// Zero-based position among accepted ledger rows; stable row id.
    pub row: usize,
    pub date: LedgerDate,
    pub reference: Option<String>,
    pub credit: Amount,
    pub debit: Amount,
    pub particulars: String,
    pub settlement_date: Option<NaiveDate>,
}

impl BrokerTransaction {
    /// A row with neither credit nor debit is not a transaction.
    pub fn is_empty_movement(&self) -> bool {
        self.credit.is_zero() && self.debit.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sentinel_is_not_a_reference() {
        let tx = BankTransaction {
            row: 0,
            date: d(2025, 8, 28),
            amount: Amount::from_decimal(Decimal::from(100)),
            reference: UNKNOWN_REF.to_string(),
            narration: "SETTLEMENT".to_string(),
            source_line: "1 28/08/2025 100.00 SETTLEMENT".to_string(),
            needs_review: false,
        };
        assert!(!tx.has_reference());

        let with_ref = BankTransaction {
            reference: "478322208".to_string(),
            ..tx
        };
        assert!(with_ref.has_reference());
    }

    #[test]
    fn ledger_date_day_accessor() {
        assert_eq!(LedgerDate::Day(d(2025, 8, 28)).day(), Some(d(2025, 8, 28)));
        assert_eq!(LedgerDate::Unparsed("28.08.2025*".into()).day(), None);
        assert_eq!(LedgerDate::Missing.day(), None);
    }

    #[test]
    fn ledger_date_display() {
        assert_eq!(LedgerDate::Day(d(2025, 8, 28)).to_string(), "2025-08-28");
        assert_eq!(LedgerDate::Unparsed("bad".into()).to_string(), "bad");
        assert_eq!(LedgerDate::Missing.to_string(), "");
    }

    #[test]
    fn empty_movement_detection() {
        let row = BrokerTransaction {
            row: 0,
            date: LedgerDate::Missing,
            reference: None,
            credit: Amount::zero(),
            debit: Amount::zero(),
            particulars: "Particulars".to_string(),
            settlement_date: None,
        };
        assert!(row.is_empty_movement());

        let credit = BrokerTransaction {
            credit: Amount::from_decimal(Decimal::ONE),
            ..row
        };
        assert!(!credit.is_empty_movement());
    }
}
