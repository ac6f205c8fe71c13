//! Defines the journal entry model and the atomic ledger mutations.
//!
//! Every balance-affecting write goes through [record_transaction] or
//! [crate::transfer::record_transfer]. Both open a single write-locking
//! database transaction that covers the journal insert and the balance
//! update, so a partial write is never observable: either both land or
//! neither does.

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::{Account, get_account_balance},
    currency::Currency,
    database_id::{AccountId, TransactionId, UserId},
};

use super::transaction_type::TransactionType;

// ============================================================================
// MODELS
// ============================================================================

/// The maximum number of characters kept in a journal entry's category.
pub const CATEGORY_MAX_CHARS: usize = 25;

/// The maximum number of characters kept in a journal entry's description.
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// An entry in the append-only journal.
///
/// Once written a journal entry is never updated or deleted; corrections
/// are made with new compensating entries (see [record_rebalance]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the journal entry.
    pub id: TransactionId,
    /// The account whose balance this entry contributes to.
    pub account_id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// When the transaction happened.
    pub date: Date,
    /// The unsigned magnitude of the transaction. The sign it contributes
    /// to the balance comes from `transaction_type`.
    pub amount: f64,
    /// The currency of the owning account at the time of writing.
    pub currency: Currency,
    /// A short free-text category, e.g. "groceries".
    pub category: String,
    /// A free-text description of the transaction.
    pub description: String,
    /// Whether the entry credits or debits the account, and why.
    pub transaction_type: TransactionType,
}

impl Transaction {
    /// The amount formatted for display, e.g. "450.00 RSD".
    pub fn display_amount(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency)
    }
}

/// A validated journal entry waiting to be recorded.
///
/// The web layer is responsible for field validation (non-blank category,
/// positive amount, permitted currency and type codes); the constructors
/// here only clamp the free-text fields to their column limits.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The account to record the entry against.
    pub account_id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// When the transaction happened.
    pub date: Date,
    /// The unsigned magnitude of the transaction, required to be positive.
    pub amount: f64,
    /// The currency of the owning account.
    pub currency: Currency,
    /// A short free-text category.
    pub category: String,
    /// A free-text description.
    pub description: String,
    /// Whether the entry credits or debits the account.
    pub transaction_type: TransactionType,
}

impl TransactionDraft {
    /// Create a draft journal entry, clamping `category` and `description`
    /// to their column limits.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: AccountId,
        user_id: UserId,
        date: Date,
        amount: f64,
        currency: Currency,
        category: &str,
        description: &str,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            account_id,
            user_id,
            date,
            amount,
            currency,
            category: clamp_chars(category, CATEGORY_MAX_CHARS),
            description: clamp_chars(description, DESCRIPTION_MAX_CHARS),
            transaction_type,
        }
    }

    /// Create a correction draft reconciling `account`'s cached balance
    /// with an externally observed one.
    ///
    /// `balance_diff` is the cached balance minus the observed balance: a
    /// positive difference means money has to leave the ledger, so the
    /// entry is typed [TransactionType::RebalanceOut], otherwise
    /// [TransactionType::RebalanceIn]. The magnitude is `|balance_diff|`.
    pub fn rebalance(account: &Account, balance_diff: f64, date: Date) -> Self {
        let transaction_type = if balance_diff > 0.0 {
            TransactionType::RebalanceOut
        } else {
            TransactionType::RebalanceIn
        };

        Self::new(
            account.id,
            account.user_id,
            date,
            balance_diff.abs(),
            account.currency,
            "rebalance",
            &format!("rebalance of account \"{}\"", account.name),
            transaction_type,
        )
    }
}

fn clamp_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a journal entry and apply it to the owning account's balance.
///
/// Both writes happen in one write-locking database transaction. The
/// account's balance is read back inside that transaction and the balance
/// update is applied as a relative increment, so overlapping mutations on
/// the same account cannot lose updates, and a draft that would overdraw
/// the account is rejected before anything is written.
///
/// # Errors
/// This function will return a:
/// - [Error::AccountDoesNotExist] if the draft's account id does not refer
///   to an account owned by the draft's user,
/// - [Error::InsufficientFunds] if applying the entry would take the
///   account's balance below zero,
/// - or [Error::SqlError] if there is some other SQL error.
///
/// On any error the transactional scope is rolled back and neither the
/// journal nor the balance is changed.
pub fn record_transaction(
    draft: TransactionDraft,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let balance = get_account_balance(draft.account_id, draft.user_id, &tx)?;
    let delta = draft.transaction_type.signed_amount(draft.amount);

    if balance + delta < 0.0 {
        return Err(Error::InsufficientFunds);
    }

    let transaction = insert_journal_row(&tx, &draft)?;

    tx.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        (delta, draft.account_id),
    )?;

    tx.commit()?;

    Ok(transaction)
}

/// Record a correction entry reconciling `account`'s cached balance with an
/// externally observed one, e.g. after checking a bank statement.
///
/// `balance_diff` is the cached balance minus the observed balance. The
/// correction is itself a journal entry, so the journal stays append-only
/// and the balance invariant keeps holding; see [TransactionDraft::rebalance]
/// for the sign convention.
///
/// # Errors
/// Returns the same errors as [record_transaction].
pub fn record_rebalance(
    account: &Account,
    balance_diff: f64,
    date: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    record_transaction(TransactionDraft::rebalance(account, balance_diff, date), connection)
}

/// Insert a journal row without touching any balance.
///
/// Callers must wrap this in the same transactional scope as the matching
/// balance update.
pub(crate) fn insert_journal_row(
    connection: &Connection,
    draft: &TransactionDraft,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO transactions
             (account_id, user_id, date, amount, currency, category, description, transaction_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, account_id, user_id, date, amount, currency, category, description, transaction_type",
        )?
        .query_row(
            (
                draft.account_id,
                draft.user_id,
                draft.date,
                draft.amount,
                draft.currency,
                &draft.category,
                &draft.description,
                draft.transaction_type,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::AccountDoesNotExist,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_transactions_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                currency INTEGER NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                transaction_type INTEGER NOT NULL,
                FOREIGN KEY(account_id) REFERENCES accounts(id),
                FOREIGN KEY(user_id) REFERENCES users(id)
                )",
        (),
    )?;

    // Index used by the date-ranged journal queries and reports.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        user_id: row.get(2)?,
        date: row.get(3)?,
        amount: row.get(4)?,
        currency: row.get(5)?,
        category: row.get(6)?,
        description: row.get(7)?,
        transaction_type: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod record_rebalance_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Currency, TransactionType,
        account::{Account, create_account, get_account},
        db::initialize,
        user::create_user,
    };

    use super::{TransactionDraft, record_rebalance, record_transaction};

    fn create_test_account_with_balance(conn: &Connection, balance: f64) -> Account {
        let user = create_user("Alice", "alice@example.com", "hunter2hash", conn)
            .expect("Could not create user");
        let account = create_account(user.id, "cash", Currency::SerbianDinar, conn)
            .expect("Could not create account");

        record_transaction(
            TransactionDraft::new(
                account.id,
                account.user_id,
                date!(2025 - 03 - 01),
                balance,
                account.currency,
                "salary",
                "",
                TransactionType::Income,
            ),
            conn,
        )
        .expect("Could not seed balance");

        get_account(account.user_id, account.id, conn).unwrap()
    }

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn positive_diff_is_recorded_as_rebalance_out() {
        let conn = get_test_connection();
        let account = create_test_account_with_balance(&conn, 100.0);

        // The cached balance is 100 but only 80 is really there.
        let balance_diff = account.balance - 80.0;
        let transaction =
            record_rebalance(&account, balance_diff, date!(2025 - 03 - 15), &conn)
                .expect("Could not record rebalance");

        assert_eq!(transaction.transaction_type, TransactionType::RebalanceOut);
        assert_eq!(transaction.amount, 20.0);
        assert_eq!(transaction.category, "rebalance");
        assert_eq!(transaction.description, "rebalance of account \"cash\"");

        let account = get_account(account.user_id, account.id, &conn).unwrap();
        assert_eq!(account.balance, 80.0);
    }

    #[test]
    fn negative_diff_is_recorded_as_rebalance_in() {
        let conn = get_test_connection();
        let account = create_test_account_with_balance(&conn, 100.0);

        let balance_diff = account.balance - 130.0;
        let transaction =
            record_rebalance(&account, balance_diff, date!(2025 - 03 - 15), &conn)
                .expect("Could not record rebalance");

        assert_eq!(transaction.transaction_type, TransactionType::RebalanceIn);
        assert_eq!(transaction.amount, 30.0);

        let account = get_account(account.user_id, account.id, &conn).unwrap();
        assert_eq!(account.balance, 130.0);
    }

    #[test]
    fn journal_sum_matches_balance_after_income_expense_and_rebalance() {
        let conn = get_test_connection();
        let account = create_test_account_with_balance(&conn, 500.0);

        record_transaction(
            TransactionDraft::new(
                account.id,
                account.user_id,
                date!(2025 - 03 - 02),
                200.0,
                account.currency,
                "groceries",
                "",
                TransactionType::Expense,
            ),
            &conn,
        )
        .unwrap();

        let account = get_account(account.user_id, account.id, &conn).unwrap();
        assert_eq!(account.balance, 300.0);

        record_rebalance(&account, account.balance - 250.0, date!(2025 - 03 - 03), &conn)
            .unwrap();

        let account = get_account(account.user_id, account.id, &conn).unwrap();
        assert_eq!(account.balance, 250.0);

        let (count, signed_sum): (i64, f64) = conn
            .query_row(
                "SELECT COUNT(id), SUM(CASE WHEN transaction_type IN (0, 2, 4)
                        THEN amount ELSE -amount END)
                 FROM transactions WHERE account_id = ?1",
                [account.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(signed_sum, 250.0);
    }
}
