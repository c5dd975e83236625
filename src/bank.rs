//! The catalogue of financial institutions that debts are owed to.

use rusqlite::{Connection, Row};

use crate::Error;

/// A database ID for a bank.
pub type BankId = i64;

/// A bank or other financial institution.
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub id: BankId,
    pub name: String,
    pub country_of_origin: Option<String>,
    pub issues_credit_cards: bool,
    pub grants_loans: bool,
    /// E.g. "Commercial bank", "Fintech".
    pub institution_type: Option<String>,
}

/// The details needed to add a bank to the catalogue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewBank<'a> {
    pub name: &'a str,
    pub country_of_origin: Option<&'a str>,
    pub issues_credit_cards: bool,
    pub grants_loans: bool,
    pub institution_type: Option<&'a str>,
}

const fn bank<'a>(
    name: &'a str,
    country_of_origin: &'a str,
    issues_credit_cards: bool,
    grants_loans: bool,
    institution_type: &'a str,
) -> NewBank<'a> {
    NewBank {
        name,
        country_of_origin: Some(country_of_origin),
        issues_credit_cards,
        grants_loans,
        institution_type: Some(institution_type),
    }
}

/// Institutions operating in Mexico, inserted into an empty database.
pub const DEFAULT_BANKS: &[NewBank<'static>] = &[
    bank("BBVA México", "Spain", true, true, "Commercial bank"),
    bank("Banorte", "Mexico", true, true, "Commercial bank"),
    bank("Santander México", "Spain", true, true, "Commercial bank"),
    bank("Banamex", "Mexico", true, true, "Commercial bank"),
    bank("HSBC México", "United Kingdom", true, true, "Commercial bank"),
    bank("Scotiabank México", "Canada", true, true, "Commercial bank"),
    bank("Banco Azteca", "Mexico", true, true, "Commercial bank"),
    bank("BanCoppel", "Mexico", true, true, "Commercial bank"),
    bank("Inbursa", "Mexico", true, true, "Commercial bank"),
    bank("Banregio", "Mexico", true, true, "Commercial bank"),
    bank("Hey Banco", "Mexico", true, true, "Digital bank"),
    bank("Nu México", "Brazil", true, true, "Fintech"),
    bank("Stori", "Mexico", true, false, "Fintech"),
    bank("Klar", "Mexico", true, true, "Fintech"),
    bank("Infonavit", "Mexico", false, true, "Government housing fund"),
    bank("Caja Popular Mexicana", "Mexico", false, true, "Credit union"),
    bank("Banco del Bienestar", "Mexico", false, false, "Development bank"),
    bank("Mercado Pago", "Argentina", false, false, "Payment service"),
];

/// Create the bank table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL CHECK (length(name) <= 100),
                country_of_origin TEXT CHECK (length(country_of_origin) <= 100),
                issues_credit_cards INTEGER NOT NULL,
                grants_loans INTEGER NOT NULL,
                institution_type TEXT CHECK (length(institution_type) <= 50)
                )",
        (),
    )?;

    Ok(())
}

/// Add a bank to the catalogue.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn insert_bank(bank: NewBank, connection: &Connection) -> Result<Bank, Error> {
    connection.execute(
        "INSERT INTO bank (name, country_of_origin, issues_credit_cards, grants_loans, institution_type)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            bank.name,
            bank.country_of_origin,
            bank.issues_credit_cards,
            bank.grants_loans,
            bank.institution_type,
        ),
    )?;

    Ok(Bank {
        id: connection.last_insert_rowid(),
        name: bank.name.to_owned(),
        country_of_origin: bank.country_of_origin.map(str::to_owned),
        issues_credit_cards: bank.issues_credit_cards,
        grants_loans: bank.grants_loans,
        institution_type: bank.institution_type.map(str::to_owned),
    })
}

/// Insert [DEFAULT_BANKS] if the bank table is empty.
///
/// Returns the number of banks inserted, which is zero when the catalogue
/// already exists.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn seed_default_banks(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM bank", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(0);
    }

    for bank in DEFAULT_BANKS {
        insert_bank(*bank, connection)?;
    }

    tracing::info!("Added {} banks to the catalogue", DEFAULT_BANKS.len());

    Ok(DEFAULT_BANKS.len())
}

fn map_bank_row(row: &Row) -> Result<Bank, rusqlite::Error> {
    Ok(Bank {
        id: row.get(0)?,
        name: row.get(1)?,
        country_of_origin: row.get(2)?,
        issues_credit_cards: row.get(3)?,
        grants_loans: row.get(4)?,
        institution_type: row.get(5)?,
    })
}

/// Get the banks that issue credit cards or grant loans, ordered by name.
///
/// These are the only banks a debt can be registered against.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_lending_banks(connection: &Connection) -> Result<Vec<Bank>, Error> {
    connection
        .prepare(
            "SELECT id, name, country_of_origin, issues_credit_cards, grants_loans, institution_type
            FROM bank
            WHERE issues_credit_cards = 1 OR grants_loans = 1
            ORDER BY name ASC",
        )?
        .query_map([], map_bank_row)?
        .map(|maybe_bank| maybe_bank.map_err(Error::from))
        .collect()
}
