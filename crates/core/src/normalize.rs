//! Canonical-schema enforcement between ingestion and matching. Whatever a
//! parser produced, rows leaving here satisfy the invariants the matching
//! engine assumes: magnitudes only, trimmed references with the bank
//! sentinel applied, settlement dates defaulted, empty movements gone.
//! Row order and row ids are never changed.

use crate::txn::{BankTransaction, BrokerTransaction, UNKNOWN_REF};

pub fn bank(mut rows: Vec<BankTransaction>) -> Vec<BankTransaction> {
    for tx in &mut rows {
        tx.amount = tx.amount.magnitude();
        let trimmed = tx.reference.trim();
        tx.reference = if trimmed.is_empty() {
            UNKNOWN_REF.to_string()
        } else {
            trimmed.to_string()
        };
    }
    rows
}

pub fn broker(rows: Vec<BrokerTransaction>) -> Vec<BrokerTransaction> {
    rows.into_iter()
        .map(|mut row| {
            row.credit = row.credit.magnitude();
            row.debit = row.debit.magnitude();
            row.reference = row.reference.and_then(|r| {
                let trimmed = r.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            });
            if row.settlement_date.is_none() {
                row.settlement_date = row.date.day();
            }
            row
        })
        .filter(|row| !row.is_empty_movement())
        .collect()
}
