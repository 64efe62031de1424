//! Reference extraction for statement blocks. The rules encode how the
//! supported banks print counterparty references: CDS deposit slips, CZ
//! dividend vouchers, settlement ids with a branch suffix after a slash,
//! and bare numeric ids. Tax entries carry no usable reference at all.

/// One extraction rule. Rules run top-down over a block's candidate tokens;
/// the first hit decides the outcome for the whole block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefRule {
    /// Suppress extraction when the narration context carries a keyword.
    SuppressKeyword(&'static str),
    /// First token starting with the prefix is the reference as printed.
    Prefix(&'static str),
    /// First token ending with the suffix and longer than `longer_than`.
    Suffix {
        suffix: &'static str,
        longer_than: usize,
    },
    /// First token with a `/` whose left part is all digits and longer than
    /// `longer_than`; the suffix after the slash is discarded.
    DigitsBeforeSlash { longer_than: usize },
    /// First all-digit token (commas ignored) with length in
    /// `[min_len, max_len]`.
    BareDigits { min_len: usize, max_len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleHit {
    Suppress,
    Reference { token_index: usize, value: String },
}

impl RefRule {
    pub fn apply(&self, tokens: &[String], context_lower: &str) -> Option<RuleHit> {
        match self {
            RefRule::SuppressKeyword(keyword) => {
                context_lower.contains(keyword).then_some(RuleHit::Suppress)
            }
            RefRule::Prefix(prefix) => tokens.iter().enumerate().find_map(|(i, t)| {
                t.starts_with(prefix).then(|| RuleHit::Reference {
                    token_index: i,
                    value: t.clone(),
                })
            }),
            RefRule::Suffix { suffix, longer_than } => {
                tokens.iter().enumerate().find_map(|(i, t)| {
                    (t.ends_with(suffix) && t.len() > *longer_than).then(|| RuleHit::Reference {
                        token_index: i,
                        value: t.clone(),
                    })
                })
            }
            RefRule::DigitsBeforeSlash { longer_than } => {
                tokens.iter().enumerate().find_map(|(i, t)| {
                    let (left, _) = t.split_once('/')?;
                    (left.len() > *longer_than && left.bytes().all(|b| b.is_ascii_digit())).then(
                        || RuleHit::Reference {
                            token_index: i,
                            value: left.to_string(),
                        },
                    )
                })
            }
            RefRule::BareDigits { min_len, max_len } => {
                tokens.iter().enumerate().find_map(|(i, t)| {
                    let digits = t.replace(',', "");
                    (!digits.is_empty()
                        && digits.bytes().all(|b| b.is_ascii_digit())
                        && (*min_len..=*max_len).contains(&digits.len()))
                    .then(|| RuleHit::Reference {
                        token_index: i,
                        value: digits,
                    })
                })
            }
        }
    }
}

/// Production rule set, highest priority first.
pub const DEFAULT_RULES: &[RefRule] = &[
    RefRule::SuppressKeyword("tax"),
    RefRule::Prefix("CDS-"),
    RefRule::Suffix {
        suffix: "CZ",
        longer_than: 10,
    },
    RefRule::DigitsBeforeSlash { longer_than: 6 },
    RefRule::BareDigits {
        min_len: 5,
        max_len: 16,
    },
];

pub struct RefRuleEngine {
    rules: Vec<RefRule>,
}

impl Default for RefRuleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl RefRuleEngine {
    pub fn new(rules: Vec<RefRule>) -> Self {
        Self { rules }
    }

    /// First rule that fires decides: suppression yields no reference, a
    /// reference hit yields the source token's index and the cleaned value.
    pub fn extract(&self, tokens: &[String], context_lower: &str) -> Option<(usize, String)> {
        for rule in &self.rules {
            match rule.apply(tokens, context_lower) {
                Some(RuleHit::Suppress) => return None,
                Some(RuleHit::Reference { token_index, value }) => {
                    return Some((token_index, value))
                }
                None => {}
            }
        }
        None
    }
}
