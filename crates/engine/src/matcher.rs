//! The tier cascade. Bank rows are processed in statement order, so
//! earlier rows claim contested candidates first. Assignment is greedy
//! and irrevocable, never a global optimum; that order dependence is part
//! of the contract with operators, who read reports top to bottom.

use uuid::Uuid;

use concord_core::{BankTransaction, BrokerTransaction, ExceptionCode, ExceptionRecord};

use crate::config::ReconConfig;
use crate::model::{MatchKind, MatchOutcome, MatchRecord};
use crate::pool::CandidatePool;
use crate::rules;

pub struct MatchEngine<'a> {
    config: &'a ReconConfig,
}

impl<'a> MatchEngine<'a> {
    pub fn new(config: &'a ReconConfig) -> Self {
        Self { config }
    }

    /// Runs the cascade for every bank row against the shared pool.
    /// Outcomes come back in statement order, exceptions in generation
    /// order.
    pub fn run(
        &self,
        bank: &[BankTransaction],
        pool: &mut CandidatePool,
    ) -> (Vec<MatchOutcome>, Vec<ExceptionRecord>) {
        let mut outcomes = Vec::with_capacity(bank.len());
        let mut exceptions = Vec::new();
        for tx in bank {
            outcomes.push(self.match_one(tx, pool, &mut exceptions));
        }
        (outcomes, exceptions)
    }

    fn match_one(
        &self,
        bank: &BankTransaction,
        pool: &mut CandidatePool,
        exceptions: &mut Vec<ExceptionRecord>,
    ) -> MatchOutcome {
        let candidates = pool.candidates_within(bank.date, self.config.date_window_days);
        let tolerance = rules::tolerance(bank.amount, &bank.narration, &self.config.tolerance);

        // Tier 1: exact reference plus tolerable amount. The sentinel left
        // by normalization is not a reference and never matches.
        if bank.has_reference() {
            for &idx in &candidates {
                let row = pool.get(idx);
                if row.reference.as_deref() == Some(bank.reference.as_str())
                    && bank.amount.abs_diff(row.credit) <= tolerance
                {
                    let record = record(MatchKind::Exact, bank, row);
                    pool.consume(idx);
                    return MatchOutcome::Exact(record);
                }
            }
        }

        // Tier 2: amount alone. Acceptable only when the candidate is
        // unique; with several tolerable credits the amount cannot tell
        // them apart, and the ambiguity is carried into tier 3.
        let tolerable: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&idx| bank.amount.abs_diff(pool.get(idx).credit) <= tolerance)
            .collect();

        if tolerable.len() == 1 {
            let idx = tolerable[0];
            let row = pool.get(idx);
            exceptions.push(ExceptionRecord::new(
                ExceptionCode::RefMismatch,
                format!(
                    "reference mismatch: bank '{}' vs broker '{}'",
                    bank.reference,
                    row.reference.as_deref().unwrap_or("")
                ),
                Some(bank.reference.clone()),
                row.reference.clone(),
            ));
            let record = record(MatchKind::AmountOnly, bank, row);
            pool.consume(idx);
            return MatchOutcome::AmountOnly(record);
        }

        // Tier 3: similarity of reference or narration text, still under
        // the amount tolerance. First qualifying candidate in ledger
        // order wins; there is no scoring across qualifiers.
        if self.config.similarity_enabled {
            let threshold = self.config.similarity_threshold;
            for &idx in &candidates {
                let row = pool.get(idx);
                let reference_hit = bank.has_reference()
                    && row
                        .reference
                        .as_deref()
                        .is_some_and(|r| rules::similar(&bank.reference, r, threshold));
                let narration_hit = rules::similar(&bank.narration, &row.particulars, threshold);
                if (reference_hit || narration_hit)
                    && bank.amount.abs_diff(row.credit) <= tolerance
                {
                    let record = record(MatchKind::Fuzzy, bank, row);
                    pool.consume(idx);
                    return MatchOutcome::Fuzzy(record);
                }
            }
        }

        if tolerable.len() > 1 {
            let rows: Vec<String> = tolerable
                .iter()
                .map(|&idx| pool.get(idx).row.to_string())
                .collect();
            exceptions.push(ExceptionRecord::new(
                ExceptionCode::AmbiguousMatch,
                format!(
                    "{} broker credits within tolerance of bank row {} (broker rows {}); left unmatched",
                    tolerable.len(),
                    bank.row,
                    rows.join(", ")
                ),
                bank.has_reference().then(|| bank.reference.clone()),
                None,
            ));
            return MatchOutcome::Unmatched {
                bank_row: bank.row,
                reason: format!(
                    "{} broker credits within tolerance; nothing to discriminate between them",
                    tolerable.len()
                ),
            };
        }

        MatchOutcome::Unmatched {
            bank_row: bank.row,
            reason: "no matching candidate found in window/tolerance".to_string(),
        }
    }
}

fn record(kind: MatchKind, bank: &BankTransaction, broker: &BrokerTransaction) -> MatchRecord {
    MatchRecord {
        match_id: Uuid::new_v4(),
        kind,
        bank_row: bank.row,
        broker_row: broker.row,
        date: bank.date,
        bank_amount: bank.amount,
        broker_credit: broker.credit,
        delta: bank.amount - broker.credit,
        bank_reference: bank.reference.clone(),
        broker_reference: broker.reference.clone(),
    }
}
