//! Storage of the expenses a user records.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{Error, auth::UserID};

/// A database ID for an expense.
pub type ExpenseId = i64;

/// What kind of spending an expense is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    /// Small impulse purchases such as snacks, cravings and apps.
    Ant,
    /// Costs that are the same every month.
    Fixed,
    /// Necessary costs that change from month to month.
    Variable,
}

impl ExpenseCategory {
    /// Every category, in the order they are shown to the user.
    pub const ALL: [ExpenseCategory; 3] = [
        ExpenseCategory::Ant,
        ExpenseCategory::Fixed,
        ExpenseCategory::Variable,
    ];

    /// The value stored in the database and sent by HTML forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Ant => "ant",
            ExpenseCategory::Fixed => "fixed",
            ExpenseCategory::Variable => "variable",
        }
    }

    /// The name shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Ant => "Ant expense (snacks, cravings, apps)",
            ExpenseCategory::Fixed => "Fixed expense",
            ExpenseCategory::Variable => "Variable expense",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ant" => Ok(ExpenseCategory::Ant),
            "fixed" => Ok(ExpenseCategory::Fixed),
            "variable" => Ok(ExpenseCategory::Variable),
            other => Err(Error::InvalidChoice(other.to_owned())),
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Money the user has spent.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// The expense's ID in the application database.
    pub id: ExpenseId,
    /// The user who spent the money.
    pub user_id: UserID,
    /// What the money was spent on.
    pub description: String,
    /// How much was spent.
    pub amount: f64,
    /// What kind of spending it was.
    pub category: ExpenseCategory,
    /// When the expense was recorded, in UTC.
    pub created_at: OffsetDateTime,
}

/// A validated expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// What the money was spent on, at most 100 characters.
    pub description: String,
    /// At least 0.1.
    pub amount: f64,
    /// What kind of spending it was.
    pub category: ExpenseCategory,
}

/// Create the expense table.
///
/// The user table must exist first.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                description TEXT NOT NULL CHECK (length(description) <= 100),
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_id ON expense(user_id)",
        (),
    )?;

    Ok(())
}

/// Save an expense for `user_id`, timestamped with the current time.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn create_expense(
    user_id: UserID,
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<Expense, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO expense (user_id, description, amount, category, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            &new_expense.description,
            new_expense.amount,
            new_expense.category.as_str(),
            created_at,
        ),
    )?;

    Ok(Expense {
        id: connection.last_insert_rowid(),
        user_id,
        description: new_expense.description,
        amount: new_expense.amount,
        category: new_expense.category,
        created_at,
    })
}

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(4)?;
    let category = raw_category
        .parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(error)))?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        description: row.get(2)?,
        amount: row.get(3)?,
        category,
        created_at: row.get(5)?,
    })
}

/// Get every expense belonging to `user_id`, newest first.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_expenses_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, description, amount, category, created_at
            FROM expense
            WHERE user_id = :user_id
            ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Delete the expense `expense_id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns an [Error::DeleteMissingExpense] if the user has no expense with `expense_id`.
pub fn delete_expense(
    user_id: UserID,
    expense_id: ExpenseId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

#[cfg(test)]
mod expense_tests {
    use std::str::FromStr;

    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{UserID, create_user, test_user},
        db::initialize,
    };

    use super::{
        ExpenseCategory, NewExpense, create_expense, delete_expense, get_expenses_for_user,
    };

    fn get_connection_with_users() -> (Connection, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ana = create_user(test_user("ana@example.com"), &connection).unwrap();
        let luis = create_user(test_user("luis@example.com"), &connection).unwrap();

        (connection, ana.id, luis.id)
    }

    fn new_expense(description: &str, amount: f64, category: ExpenseCategory) -> NewExpense {
        NewExpense {
            description: description.to_owned(),
            amount,
            category,
        }
    }

    #[test]
    fn created_expense_round_trips_through_database() {
        let (connection, ana, _) = get_connection_with_users();

        let expense = create_expense(
            ana,
            new_expense("Coffee", 45.0, ExpenseCategory::Ant),
            &connection,
        )
        .unwrap();

        assert_eq!(get_expenses_for_user(ana, &connection).unwrap(), vec![expense]);
    }

    #[test]
    fn expenses_are_listed_newest_first() {
        let (connection, ana, _) = get_connection_with_users();
        let rent = create_expense(
            ana,
            new_expense("Rent", 8000.0, ExpenseCategory::Fixed),
            &connection,
        )
        .unwrap();
        let snack = create_expense(
            ana,
            new_expense("Chips", 25.0, ExpenseCategory::Ant),
            &connection,
        )
        .unwrap();

        let ids = get_expenses_for_user(ana, &connection)
            .unwrap()
            .into_iter()
            .map(|expense| expense.id)
            .collect::<Vec<_>>();

        assert_eq!(ids, vec![snack.id, rent.id]);
    }

    #[test]
    fn expenses_are_scoped_to_their_owner() {
        let (connection, ana, luis) = get_connection_with_users();
        create_expense(
            luis,
            new_expense("Groceries", 900.0, ExpenseCategory::Variable),
            &connection,
        )
        .unwrap();

        assert!(get_expenses_for_user(ana, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_expense_only_removes_owned_expense() {
        let (connection, ana, luis) = get_connection_with_users();
        let expense = create_expense(
            ana,
            new_expense("Streaming", 139.0, ExpenseCategory::Ant),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_expense(luis, expense.id, &connection),
            Err(Error::DeleteMissingExpense)
        );
        assert_eq!(delete_expense(ana, expense.id, &connection), Ok(()));
        assert!(get_expenses_for_user(ana, &connection).unwrap().is_empty());
    }

    #[test]
    fn parses_category_names() {
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::from_str(category.as_str()), Ok(category));
        }

        assert_eq!(
            ExpenseCategory::from_str("hormiga"),
            Err(Error::InvalidChoice("hormiga".to_owned()))
        );
    }

    #[test]
    fn deleting_user_deletes_their_expenses() {
        let (connection, ana, luis) = get_connection_with_users();
        create_expense(
            ana,
            new_expense("Coffee", 45.0, ExpenseCategory::Ant),
            &connection,
        )
        .unwrap();
        let luis_expense = create_expense(
            luis,
            new_expense("Rent", 8000.0, ExpenseCategory::Fixed),
            &connection,
        )
        .unwrap();

        connection
            .execute("DELETE FROM user WHERE id = ?1", (ana.as_i64(),))
            .unwrap();

        assert_eq!(get_expenses_for_user(ana, &connection).unwrap(), vec![]);
        assert_eq!(get_expenses_for_user(luis, &connection).unwrap(), vec![luis_expense]);
    }

    #[test]
    fn description_at_length_limit_is_stored() {
        let (connection, ana, _) = get_connection_with_users();
        // 100 code points, the most the column allows.
        let description = "e\u{0301}".repeat(50);

        let expense = create_expense(
            ana,
            new_expense(&description, 10.0, ExpenseCategory::Ant),
            &connection,
        )
        .unwrap();

        assert_eq!(expense.description, description);
    }
}
