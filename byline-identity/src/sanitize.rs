//! Input sanitization gates.
//!
//! Each predicate answers one question: does the value avoid every
//! character its disallowed pattern names? Values are checked before
//! they reach the store or the hasher; a failed check short-circuits
//! the operation with no side effects.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters a username may not contain: anything outside `[A-Za-z0-9_-]`.
static USERNAME_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\-]").expect("username pattern is valid"));

/// Characters a password may not contain: spaces and both quote kinds.
static PASSWORD_DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[ '"]"#).expect("password pattern is valid"));

/// True when `value` contains none of the characters `disallowed` matches.
pub fn is_sanitized(value: &str, disallowed: &Regex) -> bool {
    !disallowed.is_match(value)
}

pub fn username_is_sanitized(username: &str) -> bool {
    is_sanitized(username, &USERNAME_DISALLOWED)
}

pub fn password_is_sanitized(password: &str) -> bool {
    is_sanitized(password, &PASSWORD_DISALLOWED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_allow_word_chars_dash_and_underscore() {
        assert!(username_is_sanitized("alice_b-2"));
        assert!(username_is_sanitized("UPPER_lower-0123456789"));
    }

    #[test]
    fn usernames_reject_everything_else() {
        for bad in ["alice b", "alice'", "alice\"", "alice!", "al.ice", "ali/ce", "日本語"] {
            assert!(!username_is_sanitized(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn passwords_reject_spaces_and_quotes_only() {
        assert!(!password_is_sanitized("pass word"));
        assert!(!password_is_sanitized("pass'word"));
        assert!(!password_is_sanitized("pass\"word"));

        // Everything else is allowed, including other specials
        assert!(password_is_sanitized("p@ssw0rd!#$%^&*()"));
    }

    #[test]
    fn empty_values_contain_no_disallowed_chars() {
        assert!(username_is_sanitized(""));
        assert!(password_is_sanitized(""));
    }
}
