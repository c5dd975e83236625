//! The token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

/// Identifies the logged in user and when their session ends.
///
/// The token is stored as JSON in a private cookie, so the client can neither
/// read nor tamper with the user ID or expiry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

#[cfg(test)]
mod token_tests {
    use time::{UtcOffset, macros::datetime};

    use crate::auth::UserID;

    use super::Token;

    #[test]
    fn serializes_expiry_as_rfc3339() {
        let token = Token {
            user_id: UserID::new(1),
            expires_at: datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert_eq!(json, r#"{"user_id":1,"expires_at":"2025-12-21T00:00:00Z"}"#);
    }

    #[test]
    fn keeps_local_offset() {
        let token = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2026-03-01 18:30:00 -6),
        };

        let json = serde_json::to_string(&token).unwrap();

        assert!(json.contains("18:30:00-06:00"), "want local time in {json}");
        assert_eq!(serde_json::from_str::<Token>(&json).unwrap(), token);
    }

    #[test]
    fn rejects_malformed_expiry() {
        let result = serde_json::from_str::<Token>(r#"{"user_id":1,"expires_at":"tomorrow"}"#);

        assert!(result.is_err());
    }
}
