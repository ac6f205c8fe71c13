//! Aggregate reports computed over the journal.
//!
//! Nothing in this module writes to the database; report correctness rests
//! entirely on the filter semantics of the journal queries (inclusive date
//! bounds, exact type matches).

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    currency::Currency,
    database_id::UserId,
    transaction::{Transaction, TransactionType},
};

/// One row of the category breakdown report: how often a category was used
/// in a date range and how much was spent on it, per currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupingReport {
    /// The journal entries' category.
    pub category: String,
    /// The number of journal entries in the group.
    pub count: i64,
    /// The summed (unsigned) amount of the group.
    pub amount: f64,
    /// The currency the amounts are in.
    pub currency: Currency,
}

/// Group a user's journal entries of one type by `(category, currency)`
/// over a date range (inclusive on both ends), largest total first.
///
/// The transaction pages pass [TransactionType::Expense] to show where the
/// money went.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_grouping_by_date(
    user_id: UserId,
    transaction_type: TransactionType,
    start_date: Date,
    end_date: Date,
    connection: &Connection,
) -> Result<Vec<GroupingReport>, Error> {
    connection
        .prepare(
            "SELECT category, COUNT(id), SUM(amount), currency
             FROM transactions
             WHERE user_id = ?1
             AND date BETWEEN ?2 AND ?3
             AND transaction_type = ?4
             GROUP BY category, currency
             ORDER BY SUM(amount) DESC",
        )?
        .query_map(
            (user_id, start_date, end_date, transaction_type),
            |row| {
                Ok(GroupingReport {
                    category: row.get(0)?,
                    count: row.get(1)?,
                    amount: row.get(2)?,
                    currency: row.get(3)?,
                })
            },
        )?
        .map(|report_result| report_result.map_err(Error::SqlError))
        .collect()
}

/// Income and spending totals per currency over a list of journal entries.
///
/// `progress_*` is spending as a rounded percentage of income, the number
/// behind the "spent x% of what you earned" bar on the overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct TotalReport {
    /// Total income in euros.
    pub income_eur: f64,
    /// Total spending in euros.
    pub expense_eur: f64,
    /// Euro spending as a percentage of euro income.
    pub progress_eur: i64,
    /// Total income in dinars.
    pub income_rsd: f64,
    /// Total spending in dinars.
    pub expense_rsd: f64,
    /// Dinar spending as a percentage of dinar income.
    pub progress_rsd: i64,
    /// The income entries behind the totals.
    pub income_transactions: Vec<Transaction>,
    /// The expense entries behind the totals.
    pub expense_transactions: Vec<Transaction>,
}

/// Compute per-currency income/spending totals over `transactions`.
///
/// Only [TransactionType::Income] and [TransactionType::Expense] entries
/// count: transfers move money between the user's own accounts and
/// rebalances are corrections, so neither is earning or spending.
pub fn total_report(transactions: &[Transaction]) -> TotalReport {
    let mut report = TotalReport::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Income => {
                match transaction.currency {
                    Currency::Euro => report.income_eur += transaction.amount,
                    Currency::SerbianDinar => report.income_rsd += transaction.amount,
                }
                report.income_transactions.push(transaction.clone());
            }
            TransactionType::Expense => {
                match transaction.currency {
                    Currency::Euro => report.expense_eur += transaction.amount,
                    Currency::SerbianDinar => report.expense_rsd += transaction.amount,
                }
                report.expense_transactions.push(transaction.clone());
            }
            TransactionType::TransferIn
            | TransactionType::TransferOut
            | TransactionType::RebalanceIn
            | TransactionType::RebalanceOut => {}
        }
    }

    report.progress_eur = percent_of(report.expense_eur, report.income_eur);
    report.progress_rsd = percent_of(report.expense_rsd, report.income_rsd);

    report
}

fn percent_of(value: f64, total: f64) -> i64 {
    if total == 0.0 {
        0
    } else {
        ((value / total) * 100.0).round() as i64
    }
}
