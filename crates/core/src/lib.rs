pub mod dates;
pub mod exception;
pub mod money;
pub mod normalize;
pub mod txn;

pub use exception::{ExceptionCode, ExceptionRecord};
pub use money::Amount;
pub use txn::{BankTransaction, BrokerTransaction, LedgerDate, UNKNOWN_REF};
