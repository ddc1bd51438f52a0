//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The input contains whitespace.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
}

/// An email address.
///
/// Mirrors the checks the login and registration forms apply before anything
/// is sent to the backend: a non-empty local part and domain around an @ and
/// no whitespace.
///
/// ## Constraints
///
/// - Must contain an @ symbol with at least one character on each side
/// - The local part may itself contain @ (`@a@b` is accepted)
/// - No whitespace anywhere
/// - No length limit; the backend owns that check
///
/// ## Examples
///
/// ```
/// use bazaryo_core::Email;
///
/// assert!(Email::parse("asha@bazaryo.in").is_ok());
/// assert!(Email::parse("fresh-market@shops.bazaryo.in").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("asha.bazaryo.in").is_err());
/// assert!(Email::parse("@bazaryo.in").is_err());
/// assert!(Email::parse("asha@").is_err());
/// assert!(Email::parse("asha k@bazaryo.in").is_err());
/// assert!(Email::parse("@a@b").is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not contain an @ symbol
    /// - Has no @ with a character on both sides
    /// - Contains whitespace
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        if !s.contains('@') {
            return Err(EmailError::MissingAtSymbol);
        }

        if separator(s).is_none() {
            return Err(if s.starts_with('@') && s.matches('@').count() == 1 {
                EmailError::EmptyLocalPart
            } else {
                EmailError::EmptyDomain
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns everything before the separating @.
    #[must_use]
    pub fn local_part(&self) -> &str {
        separator(&self.0)
            .and_then(|at| self.0.get(..at))
            .unwrap_or_default()
    }

    /// Returns everything after the separating @.
    #[must_use]
    pub fn domain(&self) -> &str {
        separator(&self.0)
            .and_then(|at| self.0.get(at + 1..))
            .unwrap_or_default()
    }
}

/// Byte index of the last @ that has at least one character on each side.
fn separator(s: &str) -> Option<usize> {
    s.char_indices()
        .rev()
        .find(|&(at, c)| c == '@' && at > 0 && at + 1 < s.len())
        .map(|(at, _)| at)
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_login_shaped_addresses() {
        for ok in ["asha@bazaryo.in", "shop+orders@mail.example.co.in", "a@b"] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
        assert!(matches!(
            Email::parse("asha.bazaryo.in"),
            Err(EmailError::MissingAtSymbol)
        ));
        assert!(matches!(
            Email::parse("@bazaryo.in"),
            Err(EmailError::EmptyLocalPart)
        ));
        assert!(matches!(Email::parse("asha@"), Err(EmailError::EmptyDomain)));
        assert!(matches!(Email::parse("@@"), Err(EmailError::EmptyDomain)));
    }

    #[test]
    fn test_accepts_any_at_with_text_around_it() {
        let email = Email::parse("@a@b").unwrap();
        assert_eq!(email.local_part(), "@a");
        assert_eq!(email.domain(), "b");

        let email = Email::parse("a@@").unwrap();
        assert_eq!(email.local_part(), "a");
        assert_eq!(email.domain(), "@");

        let long = format!("{}@bazaryo.in", "x".repeat(300));
        assert_eq!(Email::parse(&long).unwrap().local_part().len(), 300);
    }

    #[test]
    fn test_rejects_whitespace() {
        assert!(matches!(
            Email::parse("asha k@bazaryo.in"),
            Err(EmailError::ContainsWhitespace)
        ));
        assert!(matches!(
            Email::parse("asha@bazaryo.in "),
            Err(EmailError::ContainsWhitespace)
        ));
    }

    #[test]
    fn test_parts() {
        let email = Email::parse("asha@bazaryo.in").unwrap();
        assert_eq!(email.local_part(), "asha");
        assert_eq!(email.domain(), "bazaryo.in");
        assert_eq!(email.to_string(), "asha@bazaryo.in");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email: Email = "asha@bazaryo.in".parse().unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"asha@bazaryo.in\"");
    }
}
