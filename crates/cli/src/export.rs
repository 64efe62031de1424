//! CSV export of a reconciliation report, one file per result set.
//! Headers are written even when a set is empty, and column orderings
//! are stable so downstream sheets can rely on them.

use std::fs;
use std::path::Path;

use anyhow::Context;

use concord_engine::{MatchRecord, ReconReport};

const MATCH_HEADER: &[&str] = &[
    "match_id",
    "kind",
    "bank_row",
    "broker_row",
    "date",
    "bank_amount",
    "broker_credit",
    "delta",
    "bank_reference",
    "broker_reference",
];

const UNMATCHED_HEADER: &[&str] = &["side", "row", "date", "reference", "amount", "reason"];

const EXCEPTION_HEADER: &[&str] = &["code", "description", "bank_reference", "broker_reference"];

/// Writes `matched.csv`, `partial.csv`, `unmatched.csv` and
/// `exceptions.csv` under `out_dir`, creating the directory if needed.
pub fn write_report(report: &ReconReport, out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    write_matches(&report.matched, &out_dir.join("matched.csv"))?;
    write_matches(&report.partial, &out_dir.join("partial.csv"))?;
    write_unmatched(report, &out_dir.join("unmatched.csv"))?;
    write_exceptions(report, &out_dir.join("exceptions.csv"))?;
    Ok(())
}

fn writer(path: &Path) -> anyhow::Result<csv::Writer<fs::File>> {
    csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))
}

fn write_matches(records: &[MatchRecord], path: &Path) -> anyhow::Result<()> {
    let mut csv = writer(path)?;
    csv.write_record(MATCH_HEADER)?;
    for record in records {
        csv.write_record(&[
            record.match_id.to_string(),
            record.kind.to_string(),
            record.bank_row.to_string(),
            record.broker_row.to_string(),
            record.date.to_string(),
            record.bank_amount.to_string(),
            record.broker_credit.to_string(),
            record.delta.to_string(),
            record.bank_reference.clone(),
            record.broker_reference.clone().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn write_unmatched(report: &ReconReport, path: &Path) -> anyhow::Result<()> {
    let mut csv = writer(path)?;
    csv.write_record(UNMATCHED_HEADER)?;
    for record in &report.unmatched {
        csv.write_record(&[
            record.side.to_string(),
            record.row.to_string(),
            record.date.clone(),
            record.reference.clone().unwrap_or_default(),
            record.amount.to_string(),
            record.reason.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

fn write_exceptions(report: &ReconReport, path: &Path) -> anyhow::Result<()> {
    let mut csv = writer(path)?;
    csv.write_record(EXCEPTION_HEADER)?;
    for record in &report.exceptions {
        csv.write_record(&[
            record.code.to_string(),
            record.description.clone(),
            record.bank_reference.clone().unwrap_or_default(),
            record.broker_reference.clone().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_core::{ExceptionCode, ExceptionRecord};
    use concord_engine::{MatchKind, RunMeta, RunSummary};

    fn empty_report() -> ReconReport {
        ReconReport {
            meta: RunMeta {
                engine_version: "0.0.0".to_string(),
                run_at: "2025-08-28T00:00:00+00:00".to_string(),
            },
            summary: RunSummary {
                bank_total: 0,
                broker_total: 0,
                matched: 0,
                partial: 0,
                unmatched_bank: 0,
                unmatched_broker: 0,
                exceptions: 0,
            },
            matched: Vec::new(),
            partial: Vec::new(),
            unmatched: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn empty_report_still_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        write_report(&empty_report(), dir.path()).unwrap();

        let matched = fs::read_to_string(dir.path().join("matched.csv")).unwrap();
        assert_eq!(
            matched.trim(),
            "match_id,kind,bank_row,broker_row,date,bank_amount,broker_credit,delta,bank_reference,broker_reference"
        );
        let unmatched = fs::read_to_string(dir.path().join("unmatched.csv")).unwrap();
        assert_eq!(unmatched.trim(), "side,row,date,reference,amount,reason");
    }

    #[test]
    fn exception_rows_render_code_and_optional_refs() {
        let mut report = empty_report();
        report.exceptions.push(ExceptionRecord::new(
            ExceptionCode::RefMismatch,
            "reference mismatch: bank '478322208' vs broker '999'",
            Some("478322208".to_string()),
            Some("999".to_string()),
        ));
        report.exceptions.push(ExceptionRecord::new(
            ExceptionCode::DataIntegrity,
            "no usable amount token in block '7'; amount set to 0",
            None,
            None,
        ));

        let dir = tempfile::tempdir().unwrap();
        write_report(&report, dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join("exceptions.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("REF_MISMATCH,"));
        assert!(lines[2].starts_with("DATA_INTEGRITY,"));
        assert!(lines[2].ends_with(",,"));
    }

    #[test]
    fn match_kind_column_uses_report_form() {
        let mut report = empty_report();
        report.matched.push(MatchRecord {
            match_id: uuid::Uuid::nil(),
            kind: MatchKind::Exact,
            bank_row: 0,
            broker_row: 4,
            date: chrono::NaiveDate::from_ymd_opt(2025, 8, 28).unwrap(),
            bank_amount: concord_core::Amount::zero(),
            broker_credit: concord_core::Amount::zero(),
            delta: concord_core::Amount::zero(),
            bank_reference: "478322208".to_string(),
            broker_reference: None,
        });

        let dir = tempfile::tempdir().unwrap();
        write_report(&report, dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join("matched.csv")).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",EXACT,0,4,2025-08-28,"));
    }
}
