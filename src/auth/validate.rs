use std::sync::LazyLock;

use regex::Regex;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9][a-zA-Z0-9-]*(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$")
        .expect("email regex must compile")
});

/// `local@domain.tld`, no consecutive dots, first domain label not starting with `-`.
pub fn is_valid_email(email: &str) -> bool {
    !email.contains("..") && EMAIL_RE.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "user@example.com",
            "first.last+tag@mail.example.org",
            "a_b-c@sub-domain.example.io",
        ] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "",
            "plainaddress",
            "@example.com",
            "user@",
            "user@example",
            "user@example.c",
            "user@-example.com",
            "user..name@example.com",
            "user@example..com",
            "user name@example.com",
        ] {
            assert!(!is_valid_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn password_length() {
        assert!(!is_valid_password("short"));
        assert!(!is_valid_password("1234567"));
        assert!(is_valid_password("12345678"));
    }
}
