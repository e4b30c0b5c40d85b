pub mod admin;
pub mod ai;
pub mod lessons;
pub mod user;

use serde::Serialize;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `Some` only for present, non-blank strings.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_blank(Some(String::from("  "))), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(String::from("x"))), Some(String::from("x")));
    }
}
