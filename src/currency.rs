//! The currencies an account can be denominated in.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// A currency supported by the application.
///
/// Persisted as an integer code and displayed as its ISO 4217 code. Both
/// conversion tables are matched exhaustively, so adding a currency without
/// updating them is a compile error, and reading an unknown code from the
/// database is an error rather than a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Serbian dinar (RSD).
    SerbianDinar,
    /// Euro (EUR).
    Euro,
}

impl Currency {
    /// The integer code the currency is persisted as.
    pub fn as_code(&self) -> i64 {
        match self {
            Currency::SerbianDinar => 0,
            Currency::Euro => 1,
        }
    }

    /// Look up a currency from its persisted integer code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Currency::SerbianDinar),
            1 => Some(Currency::Euro),
            _ => None,
        }
    }

    /// Look up a currency from its display code, e.g. "RSD".
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "RSD" => Some(Currency::SerbianDinar),
            "EUR" => Some(Currency::Euro),
            _ => None,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Currency::SerbianDinar => "RSD",
            Currency::Euro => "EUR",
        };

        write!(f, "{symbol}")
    }
}

impl ToSql for Currency {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_code()))
    }
}

impl FromSql for Currency {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;

        Currency::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}
