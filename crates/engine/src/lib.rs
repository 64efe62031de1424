//! Reconciliation engine: normalization, the match cascade, and report
//! assembly. Callers feed it the raw rows both ingest paths produced and
//! get back a [`ReconReport`] ready for export.

pub mod config;
pub mod matcher;
pub mod model;
pub mod pool;
pub mod rules;

pub use config::{ConfigError, ReconConfig, ToleranceConfig};
pub use matcher::MatchEngine;
pub use model::{
    MatchKind, MatchOutcome, MatchRecord, ReconReport, RecordSide, RunMeta, RunSummary,
    UnmatchedRecord,
};
pub use pool::CandidatePool;

use chrono::Utc;
use concord_core::{normalize, Amount, BankTransaction, BrokerTransaction, ExceptionRecord};

/// Runs one reconciliation over already-ingested rows.
///
/// Both inputs are normalized here, so callers hand over parser output
/// untouched. Exceptions raised during ingest are passed through and
/// precede the ones the matcher raises.
pub fn reconcile(
    bank_rows: Vec<BankTransaction>,
    broker_rows: Vec<BrokerTransaction>,
    ingest_exceptions: Vec<ExceptionRecord>,
    config: &ReconConfig,
) -> ReconReport {
    let bank = normalize::bank(bank_rows);
    let broker = normalize::broker(broker_rows);
    let bank_total = bank.len();
    let broker_total = broker.len();

    let mut pool = CandidatePool::new(broker);
    let engine = MatchEngine::new(config);
    let (outcomes, match_exceptions) = engine.run(&bank, &mut pool);

    let mut matched = Vec::new();
    let mut partial = Vec::new();
    let mut unmatched = Vec::new();

    for (outcome, tx) in outcomes.into_iter().zip(&bank) {
        match outcome {
            MatchOutcome::Exact(record) | MatchOutcome::Fuzzy(record) => matched.push(record),
            MatchOutcome::AmountOnly(record) => partial.push(record),
            MatchOutcome::Unmatched { bank_row, reason } => unmatched.push(UnmatchedRecord {
                side: RecordSide::Bank,
                row: bank_row,
                date: tx.date.to_string(),
                reference: tx.has_reference().then(|| tx.reference.clone()),
                amount: tx.amount,
                reason,
            }),
        }
    }

    // Debit-only ledger rows were candidates in name only; leftover
    // reporting concerns unconsumed credits.
    for row in pool.remaining() {
        if row.credit > Amount::zero() {
            unmatched.push(UnmatchedRecord {
                side: RecordSide::Broker,
                row: row.row,
                date: row.date.to_string(),
                reference: row.reference.clone(),
                amount: row.credit,
                reason: "broker credit not found in bank statement".to_string(),
            });
        }
    }

    let mut exceptions = ingest_exceptions;
    exceptions.extend(match_exceptions);

    let summary = RunSummary {
        bank_total,
        broker_total,
        matched: matched.len(),
        partial: partial.len(),
        unmatched_bank: unmatched
            .iter()
            .filter(|u| u.side == RecordSide::Bank)
            .count(),
        unmatched_broker: unmatched
            .iter()
            .filter(|u| u.side == RecordSide::Broker)
            .count(),
        exceptions: exceptions.len(),
    };

    ReconReport {
        meta: RunMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: Utc::now().to_rfc3339(),
        },
        summary,
        matched,
        partial,
        unmatched,
        exceptions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use concord_core::{ExceptionCode, LedgerDate};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn amt(s: &str) -> Amount {
        Amount::from_decimal(Decimal::from_str(s).unwrap())
    }

    fn bank_tx(row: usize, reference: &str, amount: &str) -> BankTransaction {
        BankTransaction {
            row,
            date: d(2025, 8, 28),
            amount: amt(amount),
            reference: reference.to_string(),
            narration: "SETTLEMENT".to_string(),
            source_line: String::new(),
            needs_review: false,
        }
    }

    fn broker_tx(row: usize, reference: Option<&str>, credit: &str) -> BrokerTransaction {
        BrokerTransaction {
            row,
            date: LedgerDate::Day(d(2025, 8, 28)),
            reference: reference.map(str::to_string),
            credit: amt(credit),
            debit: Amount::zero(),
            particulars: "Receipt".to_string(),
            settlement_date: None,
        }
    }

    #[test]
    fn report_splits_outcomes_by_kind() {
        let bank = vec![
            bank_tx(0, "478322208", "1046729.56"),
            bank_tx(1, "CDS-2025", "500.00"),
            bank_tx(2, "7000001/123", "42.00"),
        ];
        let broker = vec![
            broker_tx(0, Some("478322208"), "1046729.56"),
            broker_tx(1, Some("999999999"), "500.00"),
            broker_tx(2, Some("555"), "9000.00"),
        ];
        let config = ReconConfig {
            similarity_enabled: false,
            ..ReconConfig::default()
        };
        let report = reconcile(bank, broker, Vec::new(), &config);

        assert_eq!(report.summary.bank_total, 3);
        assert_eq!(report.summary.broker_total, 3);
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.summary.partial, 1);
        assert_eq!(report.summary.unmatched_bank, 1);
        assert_eq!(report.summary.unmatched_broker, 1);
        assert_eq!(report.summary.exceptions, 1);

        assert_eq!(report.matched[0].kind, MatchKind::Exact);
        assert_eq!(report.matched[0].bank_row, 0);
        assert_eq!(report.partial[0].kind, MatchKind::AmountOnly);
        assert_eq!(report.partial[0].broker_row, 1);
        assert_eq!(report.exceptions[0].code, ExceptionCode::RefMismatch);

        let bank_side: Vec<_> = report
            .unmatched
            .iter()
            .filter(|u| u.side == RecordSide::Bank)
            .collect();
        assert_eq!(bank_side[0].row, 2);
        assert_eq!(bank_side[0].reference.as_deref(), Some("7000001/123"));

        let broker_side: Vec<_> = report
            .unmatched
            .iter()
            .filter(|u| u.side == RecordSide::Broker)
            .collect();
        assert_eq!(broker_side[0].row, 2);
        assert_eq!(
            broker_side[0].reason,
            "broker credit not found in bank statement"
        );
    }

    #[test]
    fn leftover_reporting_skips_debit_only_rows() {
        let mut debit_only = broker_tx(0, None, "0.00");
        debit_only.debit = amt("300.00");
        let report = reconcile(
            Vec::new(),
            vec![debit_only, broker_tx(1, Some("123456789"), "75.00")],
            Vec::new(),
            &ReconConfig::default(),
        );
        assert_eq!(report.summary.broker_total, 2);
        assert_eq!(report.summary.unmatched_broker, 1);
        assert_eq!(report.unmatched[0].row, 1);
    }

    #[test]
    fn unparsed_broker_date_renders_raw_in_report() {
        let mut row = broker_tx(0, None, "75.00");
        row.date = LedgerDate::Unparsed("32/13/2025".to_string());
        let report = reconcile(Vec::new(), vec![row], Vec::new(), &ReconConfig::default());
        assert_eq!(report.unmatched[0].date, "32/13/2025");
    }

    #[test]
    fn ingest_exceptions_lead_the_exception_list() {
        let ingest = vec![ExceptionRecord::new(
            ExceptionCode::DataIntegrity,
            "no usable amount token in block '7'; amount set to 0",
            None,
            None,
        )];
        let report = reconcile(
            vec![bank_tx(0, "478322208", "100.00")],
            vec![broker_tx(0, Some("111111111"), "100.00")],
            ingest,
            &ReconConfig {
                similarity_enabled: false,
                ..ReconConfig::default()
            },
        );
        assert_eq!(report.summary.exceptions, 2);
        assert_eq!(report.exceptions[0].code, ExceptionCode::DataIntegrity);
        assert_eq!(report.exceptions[1].code, ExceptionCode::RefMismatch);
    }

    #[test]
    fn normalization_runs_inside_reconcile() {
        // Negative amount and padded reference still land an exact match.
        let bank = bank_tx(0, "  478322208  ", "-250.00");
        let broker = broker_tx(0, Some("478322208"), "-250.00");
        let report = reconcile(vec![bank], vec![broker], Vec::new(), &ReconConfig::default());
        assert_eq!(report.summary.matched, 1);
        assert_eq!(report.matched[0].bank_amount, amt("250.00"));
        assert_eq!(report.matched[0].broker_credit, amt("250.00"));
    }

    #[test]
    fn rerun_is_deterministic_apart_from_match_ids() {
        let bank = vec![
            bank_tx(0, "478322208", "100.00"),
            bank_tx(1, "CDS-2025", "100.00"),
        ];
        let broker = vec![
            broker_tx(0, Some("CDS-2025"), "100.00"),
            broker_tx(1, Some("478322208"), "100.00"),
        ];
        let config = ReconConfig::default();

        let first = reconcile(bank.clone(), broker.clone(), Vec::new(), &config);
        let second = reconcile(bank, broker, Vec::new(), &config);

        assert_eq!(first.summary, second.summary);
        let key = |r: &ReconReport| -> Vec<(usize, usize, MatchKind)> {
            r.matched
                .iter()
                .map(|m| (m.bank_row, m.broker_row, m.kind))
                .collect()
        };
        assert_eq!(key(&first), key(&second));
        assert_eq!(first.unmatched, second.unmatched);
        assert_eq!(first.exceptions, second.exceptions);
    }

    #[test]
    fn empty_inputs_make_an_empty_report() {
        let report = reconcile(Vec::new(), Vec::new(), Vec::new(), &ReconConfig::default());
        assert_eq!(report.summary.bank_total, 0);
        assert_eq!(report.summary.broker_total, 0);
        assert!(report.matched.is_empty());
        assert!(report.unmatched.is_empty());
        assert!(report.exceptions.is_empty());
        assert!(!report.meta.engine_version.is_empty());
    }
}
