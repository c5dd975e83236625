//! Storage of debts owed to lending institutions.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    bank::{BankId, get_lending_banks},
};

/// A database ID for a debt.
pub type DebtId = i64;

/// A credit card or loan a user owes money on.
#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    /// The debt's ID in the application database.
    pub id: DebtId,
    /// The user who owes the debt.
    pub user_id: UserID,
    /// The bank the debt is owed to.
    pub bank_id: BankId,
    /// The name of the bank, for display.
    pub bank_name: String,
    /// The amount currently owed.
    pub balance: f64,
    /// The maximum the user may borrow.
    pub credit_limit: f64,
    /// The annual interest rate as a percentage, e.g. 45.5 for 45.5%.
    pub annual_rate: f64,
    /// The smallest payment the lender accepts each month.
    pub minimum_payment: f64,
}

/// A validated debt that has not been saved yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewDebt {
    /// A bank that issues credit cards or grants loans.
    pub bank_id: BankId,
    /// The amount currently owed.
    pub balance: f64,
    /// The maximum the user may borrow.
    pub credit_limit: f64,
    /// The annual interest rate as a percentage.
    pub annual_rate: f64,
    /// The smallest payment the lender accepts each month.
    pub minimum_payment: f64,
}

/// Create the debt table.
///
/// The user and bank tables must exist first.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                bank_id INTEGER NOT NULL,
                balance REAL NOT NULL,
                credit_limit REAL NOT NULL DEFAULT 0,
                annual_rate REAL NOT NULL,
                minimum_payment REAL NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(bank_id) REFERENCES bank(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_debt_user_id ON debt(user_id)",
        (),
    )?;

    Ok(())
}

/// Save a debt for `user_id`.
///
/// # Errors
///
/// Returns an [Error::InvalidBank] if `new_debt.bank_id` is not a lending bank,
/// or an [Error::SqlError] if an SQL related error occurred.
pub fn create_debt(
    user_id: UserID,
    new_debt: NewDebt,
    connection: &Connection,
) -> Result<Debt, Error> {
    let bank = get_lending_banks(connection)?
        .into_iter()
        .find(|bank| bank.id == new_debt.bank_id)
        .ok_or(Error::InvalidBank(new_debt.bank_id))?;

    connection.execute(
        "INSERT INTO debt (user_id, bank_id, balance, credit_limit, annual_rate, minimum_payment)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            new_debt.bank_id,
            new_debt.balance,
            new_debt.credit_limit,
            new_debt.annual_rate,
            new_debt.minimum_payment,
        ),
    )?;

    Ok(Debt {
        id: connection.last_insert_rowid(),
        user_id,
        bank_id: bank.id,
        bank_name: bank.name,
        balance: new_debt.balance,
        credit_limit: new_debt.credit_limit,
        annual_rate: new_debt.annual_rate,
        minimum_payment: new_debt.minimum_payment,
    })
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        bank_id: row.get(2)?,
        bank_name: row.get(3)?,
        balance: row.get(4)?,
        credit_limit: row.get(5)?,
        annual_rate: row.get(6)?,
        minimum_payment: row.get(7)?,
    })
}

/// Get every debt belonging to `user_id` in the order they were created.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_debts_for_user(user_id: UserID, connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(
            "SELECT debt.id, debt.user_id, debt.bank_id, bank.name, debt.balance,
                debt.credit_limit, debt.annual_rate, debt.minimum_payment
            FROM debt
            INNER JOIN bank ON bank.id = debt.bank_id
            WHERE debt.user_id = :user_id
            ORDER BY debt.id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(Error::from))
        .collect()
}

/// Delete the debt `debt_id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingDebt] if the user has no debt with `debt_id`.
pub fn delete_debt(user_id: UserID, debt_id: DebtId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM debt WHERE id = ?1 AND user_id = ?2",
        (debt_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingDebt);
    }

    Ok(())
}
