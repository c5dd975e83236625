/*! Creates the application's database schema. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    auth::create_user_table,
    bank::{create_bank_table, seed_default_banks},
    debt::create_debt_table,
    expense::create_expense_table,
};

/// Enable foreign keys, create every table and fill in the bank catalogue.
///
/// Safe to call on an existing database: tables are only created if missing
/// and banks are only seeded into an empty table.
///
/// # Errors
/// Returns an error if any of the SQL statements fail, in which case no tables are created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction, where the pragma is a no-op.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_bank_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_expense_table(&transaction)?;
    seed_default_banks(&transaction)?;

    transaction.commit()?;

    Ok(())
}
