//! Pure matching rules: the admissible amount tolerance for one bank row,
//! and token-set text similarity. Total functions of their inputs, no state.

use std::collections::HashSet;

use concord_core::Amount;

use crate::config::ToleranceConfig;

/// Admissible absolute amount discrepancy for one bank row. An IPS marker
/// in the narration grants the configured IPS maximum; an amount at or
/// above the RTGS threshold adds the flat RTGS allowance on top. The two
/// rules are independent and additive.
pub fn tolerance(amount: Amount, narration: &str, config: &ToleranceConfig) -> Amount {
    let mut base = Amount::zero();
    if narration.to_uppercase().contains("IPS") {
        base = base.max(config.ips_max);
    }
    if amount.magnitude() >= config.rtgs_threshold {
        base = base + config.rtgs_flat;
    }
    base
}

fn token_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-set overlap: shared tokens over the smaller set's size, compared
/// against the threshold. Order- and duplicate-insensitive, so a subset
/// relation scores 1.0 no matter how long the other side is. Empty text
/// never matches anything.
pub fn similar(a: &str, b: &str, threshold: f64) -> bool {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return false;
    }
    let overlap = ta.intersection(&tb).count() as f64;
    let smaller = ta.len().min(tb.len()) as f64;
    overlap / smaller >= threshold
}
