//! Domain-level constants.
//!
//! These constants define the storage layout shared by every process that
//! reads or writes user records.

// =============================================================================
// Storage Keys
// =============================================================================

/// Counter holding the last assigned user id
pub const USER_ID_COUNTER_KEY: &str = "userid";

/// Sorted set mapping each username to its owner's id
pub const USERNAME_INDEX_KEY: &str = "usernames";

/// Sorted set mapping each email to its owner's id
pub const EMAIL_INDEX_KEY: &str = "emails";

/// Prefix of per-user record keys
pub const USER_KEY_PREFIX: &str = "user";

/// Separator between a key prefix and the id
pub const KEY_SEPARATOR: &str = ":";

/// Build the record key for a user id (`user:42`).
pub fn user_key(id: i64) -> String {
    format!("{}{}{}", USER_KEY_PREFIX, KEY_SEPARATOR, id)
}

// =============================================================================
// Record Fields
// =============================================================================

/// Record field holding the user id
pub const FIELD_ID: &str = "id";

/// Record field holding the username
pub const FIELD_NAME: &str = "name";

/// Record field holding the email address
pub const FIELD_EMAIL: &str = "email";

/// Field names owned by the entity itself; attributes may not reuse them
pub const RESERVED_FIELDS: &[&str] = &[FIELD_ID, FIELD_NAME, FIELD_EMAIL];

/// Check if a field name is reserved
pub fn is_reserved_field(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_format() {
        assert_eq!(user_key(1), "user:1");
        assert_eq!(user_key(-7), "user:-7");
        assert_eq!(user_key(i64::MAX), format!("user:{}", i64::MAX));
    }

    #[test]
    fn test_store_keys() {
        assert_eq!(USER_ID_COUNTER_KEY, "userid");
        assert_eq!(USERNAME_INDEX_KEY, "usernames");
        assert_eq!(EMAIL_INDEX_KEY, "emails");
    }

    #[test]
    fn test_reserved_fields() {
        assert!(is_reserved_field("id"));
        assert!(is_reserved_field("email"));
        assert!(!is_reserved_field("Email"));
        assert!(!is_reserved_field("nickname"));
    }
}
