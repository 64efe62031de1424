use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A 2-decimal monetary amount. Statement and ledger figures are a single
/// currency throughout, so no currency tag is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Amount(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Amount(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Absolute value. Bank amounts and broker credits compare by magnitude;
    /// direction is not part of the matching contract.
    pub fn magnitude(self) -> Self {
        Amount(self.0.abs())
    }

    pub fn abs_diff(self, other: Self) -> Self {
        Amount((self.0 - other.0).abs())
    }

    /// True for zero and near-zero values. A statement token below this
    /// threshold is never selected as the transaction amount.
    pub fn is_negligible(self) -> bool {
        self.0.abs() <= Decimal::new(1, 3)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Amount(self.0 - rhs.0)
    }
}

/// Lenient parser for extracted table cells: trims, accepts parenthesized
/// negatives and an explicit sign, strips thousands separators and stray
/// spaces. Empty or unparseable cells yield `None`; callers default to zero.
pub fn parse_cell(raw: &str) -> Option<Amount> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parenthesized = trimmed.starts_with('(') && trimmed.ends_with(')');
    let inner = if parenthesized {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    let cleaned = inner.replace([',', ' '], "");
    let mut decimal = Decimal::from_str(&cleaned).ok()?;
    if parenthesized {
        decimal = -decimal;
    }
    Some(Amount(decimal.round_dp(2)))
}

/// Strict parser for statement tokens: after comma stripping, only an
/// optionally signed digit run with an optional 2-digit fraction is an
/// amount. Zero parses fine; selection, not parsing, excludes zeros.
pub fn parse_token(token: &str) -> Option<Amount> {
    let cleaned = token.replace(',', "");
    if !is_amount_shaped(&cleaned) {
        return None;
    }
    Decimal::from_str(&cleaned).ok().map(Amount)
}

fn is_amount_shaped(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    match digits.split_once('.') {
        None => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        Some((whole, frac)) => {
            !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.len() == 2
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}
