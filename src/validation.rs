//! Field validators shared by the HTML forms.
//!
//! Each validator returns the message to display next to the offending field.

use std::str::FromStr;

use email_address::EmailAddress;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_NUMBER_MESSAGE: &str = "Not a valid number.";
pub const INVALID_INTEGER_MESSAGE: &str = "Not a valid integer value.";
pub const INVALID_CHOICE_MESSAGE: &str = "Not a valid choice.";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address.";

/// The longest email address that can be stored.
pub const MAX_EMAIL_LENGTH: usize = 120;

/// Trim `value` and reject it if nothing is left.
pub fn required(value: &str) -> Result<&str, String> {
    let value = value.trim();

    if value.is_empty() {
        Err(REQUIRED_MESSAGE.to_owned())
    } else {
        Ok(value)
    }
}

/// Check that `value` has between `min` and `max` characters, inclusive.
///
/// Characters are counted as code points, the same way SQLite's `length()`
/// counts them in the table constraints.
pub fn length_between(value: &str, min: usize, max: usize) -> Result<(), String> {
    let length = value.chars().count();

    if (min..=max).contains(&length) {
        Ok(())
    } else {
        Err(format!(
            "Field must be between {min} and {max} characters long."
        ))
    }
}

/// Parse a required decimal number.
pub fn parse_number(value: &str) -> Result<f64, String> {
    let value = required(value)?;

    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(INVALID_NUMBER_MESSAGE.to_owned()),
    }
}

/// Parse a required whole number.
pub fn parse_integer(value: &str) -> Result<i64, String> {
    let value = required(value)?;

    value
        .parse::<i64>()
        .map_err(|_| INVALID_INTEGER_MESSAGE.to_owned())
}

/// Check that `number` is at least `min` and, if given, at most `max`.
pub fn number_in_range<T>(number: T, min: T, max: Option<T>) -> Result<T, String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    match max {
        Some(max) if number < min || number > max => {
            Err(format!("Number must be between {min} and {max}."))
        }
        None if number < min => Err(format!("Number must be at least {min}.")),
        _ => Ok(number),
    }
}

/// Parse a required email address.
///
/// Addresses are lowercased so that the same person cannot register twice
/// with different capitalization.
pub fn parse_email(value: &str) -> Result<EmailAddress, String> {
    let value = required(value)?.to_lowercase();

    if value.chars().count() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Field cannot be longer than {MAX_EMAIL_LENGTH} characters."
        ));
    }

    EmailAddress::from_str(&value).map_err(|_| INVALID_EMAIL_MESSAGE.to_owned())
}

/// Check that a name only contains letters, including Spanish accented
/// letters, and whitespace.
pub fn is_name(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || "áéíóúÁÉÍÓÚñÑ".contains(c) || c.is_whitespace())
}
