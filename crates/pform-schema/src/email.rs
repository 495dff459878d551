//! Email syntax check.
//!
//! Accepts `local@domain.tld` where the local part may hold letters,
//! digits, and `_ ' + - .`, must not start with a dot or contain two dots
//! in a row, and must end on something other than a dot or apostrophe.
//! Domain labels start with a letter or digit; the TLD has at least two
//! letters. Only ASCII letters count; case-folded lookalikes such as
//! U+212A KELVIN SIGN are rejected.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$",
    )
    .ok()
});

/// Whether `s` is a syntactically valid email address.
pub fn is_valid_email(s: &str) -> bool {
    if s.starts_with('.') || s.contains("..") {
        return false;
    }
    EMAIL.as_ref().is_some_and(|re| re.is_match(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for ok in ["a@b.com", "first.last@example.org", "x+tag@mail.co.uk", "O'Neil@host.io", "ADA@EXAMPLE.COM"] {
            assert!(is_valid_email(ok), "{ok} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for bad in [
            "",
            "bad",
            "@b.com",
            "a@",
            "a@b",
            "a@b.c",
            ".a@b.com",
            "a..b@c.com",
            "a.@b.com",
            "a@-b.com",
            "a b@c.com",
            "\u{17F}@b.com",
            "a@b.co\u{212A}",
            "\u{e9}@b.com",
        ] {
            assert!(!is_valid_email(bad), "{bad} should be invalid");
        }
    }
}
