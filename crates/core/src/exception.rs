use serde::{Deserialize, Serialize};

/// Closed taxonomy of reconciliation exceptions. Codes not emitted by the
/// current pipeline stay reserved so downstream consumers can rely on the
/// full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionCode {
    AmountMismatch,
    DateMismatch,
    RefMismatch,
    AmbiguousMatch,
    MissingCounterparty,
    ToleranceViolation,
    DataIntegrity,
    ConfigError,
}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExceptionCode::AmountMismatch => write!(f, "AMOUNT_MISMATCH"),
            ExceptionCode::DateMismatch => write!(f, "DATE_MISMATCH"),
            ExceptionCode::RefMismatch => write!(f, "REF_MISMATCH"),
            ExceptionCode::AmbiguousMatch => write!(f, "AMBIGUOUS_MATCH"),
            ExceptionCode::MissingCounterparty => write!(f, "MISSING_COUNTERPARTY"),
            ExceptionCode::ToleranceViolation => write!(f, "TOLERANCE_VIOLATION"),
            ExceptionCode::DataIntegrity => write!(f, "DATA_INTEGRITY"),
            ExceptionCode::ConfigError => write!(f, "CONFIG_ERROR"),
        }
    }
}

impl std::str::FromStr for ExceptionCode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AMOUNT_MISMATCH" => Ok(ExceptionCode::AmountMismatch),
            "DATE_MISMATCH" => Ok(ExceptionCode::DateMismatch),
            "REF_MISMATCH" => Ok(ExceptionCode::RefMismatch),
            "AMBIGUOUS_MATCH" => Ok(ExceptionCode::AmbiguousMatch),
            "MISSING_COUNTERPARTY" => Ok(ExceptionCode::MissingCounterparty),
            "TOLERANCE_VIOLATION" => Ok(ExceptionCode::ToleranceViolation),
            "DATA_INTEGRITY" => Ok(ExceptionCode::DataIntegrity),
            "CONFIG_ERROR" => Ok(ExceptionCode::ConfigError),
            other => Err(format!("Unknown exception code: '{other}'")),
        }
    }
}

/// Append-only observation raised alongside ingestion or matching. Exceptions
/// never gate the run; they land in the exceptions result set as-is. The
/// reference fields carry whichever side's identifier the operator would look
/// up first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub code: ExceptionCode,
    pub description: String,
    pub bank_reference: Option<String>,
    pub broker_reference: Option<String>,
}

impl ExceptionRecord {
    pub fn new(
        code: ExceptionCode,
        description: impl Into<String>,
        bank_reference: Option<String>,
        broker_reference: Option<String>,
    ) -> Self {
        ExceptionRecord {
            code,
            description: description.into(),
            bank_reference,
            broker_reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn code_display_roundtrip() {
        let codes = [
            ExceptionCode::AmountMismatch,
            ExceptionCode::DateMismatch,
            ExceptionCode::RefMismatch,
            ExceptionCode::AmbiguousMatch,
            ExceptionCode::MissingCounterparty,
            ExceptionCode::ToleranceViolation,
            ExceptionCode::DataIntegrity,
            ExceptionCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ExceptionCode::from_str(&code.to_string()).unwrap(), code);
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert!(ExceptionCode::from_str("E-042").is_err());
    }

    #[test]
    fn record_constructor() {
        let rec = ExceptionRecord::new(
            ExceptionCode::RefMismatch,
            "refs differ",
            Some("478322208".to_string()),
            Some("999999999".to_string()),
        );
        assert_eq!(rec.code, ExceptionCode::RefMismatch);
        assert_eq!(rec.description, "refs differ");
        assert_eq!(rec.bank_reference.as_deref(), Some("478322208"));
        assert_eq!(rec.broker_reference.as_deref(), Some("999999999"));
    }
}
