//! Code for creating the user table and fetching users from the database.

use std::{fmt::Display, str::FromStr};

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, PasswordHash, debt::PayoffStrategy};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's given name.
    pub first_name: String,
    /// The user's family names.
    pub last_name: String,
    /// The user's age in years.
    pub age: u8,
    /// A 10 digit phone number.
    pub phone: String,
    /// The email address the user logs in with.
    pub email: EmailAddress,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// The user's monthly income after tax.
    pub monthly_income: f64,
    /// Rent, utilities and other costs the user pays every month.
    pub fixed_expenses: f64,
    /// How the user would like their debts ordered in the payoff plan.
    pub preferred_strategy: PayoffStrategy,
}

/// The validated details needed to register a new user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The user's given name.
    pub first_name: String,
    /// The user's family names.
    pub last_name: String,
    /// Between 18 and 120.
    pub age: u8,
    /// Exactly 10 digits.
    pub phone: String,
    /// Must not belong to another user.
    pub email: EmailAddress,
    /// The hash of a password that passed [crate::ValidatedPassword::new].
    pub password_hash: PasswordHash,
}

/// The financial details a user can change on their profile page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialProfile {
    pub monthly_income: f64,
    pub fixed_expenses: f64,
    pub preferred_strategy: PayoffStrategy,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL CHECK (length(first_name) <= 50),
                last_name TEXT NOT NULL CHECK (length(last_name) <= 100),
                age INTEGER NOT NULL,
                phone TEXT NOT NULL CHECK (length(phone) = 10),
                email TEXT UNIQUE NOT NULL CHECK (length(email) <= 120),
                password TEXT NOT NULL,
                monthly_income REAL NOT NULL DEFAULT 0,
                fixed_expenses REAL NOT NULL DEFAULT 0,
                preferred_strategy TEXT NOT NULL DEFAULT 'avalanche'
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (first_name, last_name, age, phone, email, password)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &new_user.first_name,
            &new_user.last_name,
            new_user.age,
            &new_user.phone,
            new_user.email.as_str(),
            new_user.password_hash.as_ref(),
        ),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        age: new_user.age,
        phone: new_user.phone,
        email: new_user.email,
        password_hash: new_user.password_hash,
        monthly_income: 0.0,
        fixed_expenses: 0.0,
        preferred_strategy: PayoffStrategy::default(),
    })
}

const SELECT_USER: &str = "SELECT id, first_name, last_name, age, phone, email, password, \
    monthly_income, fixed_expenses, preferred_strategy FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(5)?;
    let raw_password_hash: String = row.get(6)?;
    let raw_strategy: String = row.get(9)?;

    let email = EmailAddress::from_str(&raw_email).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let preferred_strategy = PayoffStrategy::from_str(&raw_strategy).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        age: row.get(3)?,
        phone: row.get(4)?,
        email,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        monthly_income: row.get(7)?,
        fixed_expenses: row.get(8)?,
        preferred_strategy,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &EmailAddress, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", email.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no user with `user_id`.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Set the monthly income, fixed expenses and preferred payoff strategy of a user.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no user with `user_id`.
pub fn update_financial_profile(
    user_id: UserID,
    profile: FinancialProfile,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET monthly_income = ?1, fixed_expenses = ?2, preferred_strategy = ?3
        WHERE id = ?4",
        (
            profile.monthly_income,
            profile.fixed_expenses,
            profile.preferred_strategy.as_str(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
#[cfg(test)]
pub(crate) fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

#[cfg(test)]
pub(crate) fn test_user(email: &str) -> NewUser {
    NewUser {
        first_name: "Ana".to_owned(),
        last_name: "García López".to_owned(),
        age: 30,
        phone: "5512345678".to_owned(),
        email: EmailAddress::from_str(email).unwrap(),
        password_hash: PasswordHash::new_unchecked("hunter2"),
    }
}
