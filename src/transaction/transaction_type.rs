//! The closed set of journal entry types.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// The type of a journal entry.
///
/// The type decides the sign a transaction's amount contributes to the
/// owning account's balance: `Income`, `TransferIn` and `RebalanceIn`
/// credit the account, the other three debit it. Amounts themselves are
/// stored as unsigned magnitudes.
///
/// Persisted as an integer code with an exhaustively matched conversion
/// table; an unknown code read back from the database is an error, never a
/// panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
    /// The receiving half of a transfer between two accounts.
    TransferIn,
    /// The sending half of a transfer between two accounts.
    TransferOut,
    /// A correction entry that raises the cached balance.
    RebalanceIn,
    /// A correction entry that lowers the cached balance.
    RebalanceOut,
}

impl TransactionType {
    /// The integer code the transaction type is persisted as.
    pub fn as_code(&self) -> i64 {
        match self {
            TransactionType::Income => 0,
            TransactionType::Expense => 1,
            TransactionType::TransferIn => 2,
            TransactionType::TransferOut => 3,
            TransactionType::RebalanceIn => 4,
            TransactionType::RebalanceOut => 5,
        }
    }

    /// Look up a transaction type from its persisted integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(TransactionType::Income),
            1 => Some(TransactionType::Expense),
            2 => Some(TransactionType::TransferIn),
            3 => Some(TransactionType::TransferOut),
            4 => Some(TransactionType::RebalanceIn),
            5 => Some(TransactionType::RebalanceOut),
            _ => None,
        }
    }

    /// Look up a transaction type from its display code, e.g. "IN".
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "IN" => Some(TransactionType::Income),
            "EX" => Some(TransactionType::Expense),
            "TIN" => Some(TransactionType::TransferIn),
            "TOUT" => Some(TransactionType::TransferOut),
            "RIN" => Some(TransactionType::RebalanceIn),
            "ROUT" => Some(TransactionType::RebalanceOut),
            _ => None,
        }
    }

    /// The signed contribution of `amount` to the owning account's balance.
    pub fn signed_amount(&self, amount: f64) -> f64 {
        match self {
            TransactionType::Income
            | TransactionType::TransferIn
            | TransactionType::RebalanceIn => amount,
            TransactionType::Expense
            | TransactionType::TransferOut
            | TransactionType::RebalanceOut => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            TransactionType::Income => "IN",
            TransactionType::Expense => "EX",
            TransactionType::TransferIn => "TIN",
            TransactionType::TransferOut => "TOUT",
            TransactionType::RebalanceIn => "RIN",
            TransactionType::RebalanceOut => "ROUT",
        };

        write!(f, "{symbol}")
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_code()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;

        TransactionType::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}
