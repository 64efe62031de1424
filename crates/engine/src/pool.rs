//! Candidate pool over normalized broker rows. The pool is the only
//! mutable state in a run, and membership only ever changes through
//! `consume`. Stored order is ledger order, which tier scans observe.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use concord_core::BrokerTransaction;

pub struct CandidatePool {
    rows: Vec<BrokerTransaction>,
    by_day: BTreeMap<NaiveDate, Vec<usize>>,
    consumed: Vec<bool>,
}

impl CandidatePool {
    /// Indexes rows by parsed ledger day. Rows without a parsed date are
    /// held for leftover reporting but never indexed, so they can never
    /// become candidates.
    pub fn new(rows: Vec<BrokerTransaction>) -> Self {
        let mut by_day: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (idx, row) in rows.iter().enumerate() {
            if let Some(day) = row.date.day() {
                by_day.entry(day).or_default().push(idx);
            }
        }
        let consumed = vec![false; rows.len()];
        Self {
            rows,
            by_day,
            consumed,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, idx: usize) -> &BrokerTransaction {
        &self.rows[idx]
    }

    /// Unconsumed rows dated within `window_days` of `date` (symmetric,
    /// inclusive at both edges), in ledger order. The date index is an
    /// access path only; it must not leak into the selection order.
    pub fn candidates_within(&self, date: NaiveDate, window_days: u32) -> Vec<usize> {
        let span = Days::new(u64::from(window_days));
        let (Some(start), Some(end)) = (date.checked_sub_days(span), date.checked_add_days(span))
        else {
            return Vec::new();
        };
        let mut hits: Vec<usize> = self
            .by_day
            .range(start..=end)
            .flat_map(|(_, idxs)| idxs.iter().copied())
            .filter(|&idx| !self.consumed[idx])
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Marks a row consumed for the rest of the run. Irrevocable.
    pub fn consume(&mut self, idx: usize) {
        debug_assert!(!self.consumed[idx], "broker row consumed twice");
        self.consumed[idx] = true;
    }

    /// Unconsumed rows in ledger order, for leftover reporting.
    pub fn remaining(&self) -> impl Iterator<Item = &BrokerTransaction> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| (!self.consumed[idx]).then_some(row))
    }
}
