//! One-shot messages that survive a redirect.
//!
//! The message is stored as JSON in a private cookie and removed by the first
//! page that displays it.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, alert::Alert};

/// The name of the cookie that holds the pending flash message.
pub const COOKIE_FLASH: &str = "flash";

/// Flash messages that are not shown within this time are dropped by the browser.
const FLASH_DURATION: Duration = Duration::minutes(1);

/// Queue `alert` to be shown on the next page the user loads.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the alert cannot be serialized.
pub fn set_flash(jar: PrivateCookieJar, alert: &Alert) -> Result<PrivateCookieJar, Error> {
    let value = serde_json::to_string(alert)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_FLASH, value))
            .path("/")
            .expires(OffsetDateTime::now_utc() + FLASH_DURATION)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Remove the pending flash message from `jar` and return it.
///
/// A cookie that cannot be decoded is discarded.
pub fn take_flash(jar: PrivateCookieJar) -> (PrivateCookieJar, Option<Alert>) {
    let Some(cookie) = jar.get(COOKIE_FLASH) else {
        return (jar, None);
    };

    let alert = match serde_json::from_str(cookie.value_trimmed()) {
        Ok(alert) => Some(alert),
        Err(error) => {
            tracing::warn!("Discarding unreadable flash cookie: {error}");
            None
        }
    };

    (jar.remove(Cookie::build(COOKIE_FLASH).path("/")), alert)
}
