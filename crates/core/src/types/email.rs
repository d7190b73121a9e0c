//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::{is_valid_email, sanitize_input};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty after sanitization.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not have the `local@domain.tld` shape.
    #[error("email must look like name@example.com")]
    Invalid,
}

/// A normalized email address.
///
/// Input is sanitized (trimmed, `<`/`>` removed, truncated) and lowercased
/// before validation, so two spellings of the same address compare equal.
///
/// ## Examples
///
/// ```
/// use restock_core::Email;
///
/// let email = Email::parse("  User+Tag@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "user+tag@example.com");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("user@domain").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and normalize an `Email` from user input.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for blank input and
    /// [`EmailError::Invalid`] when the shape check fails.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Err(EmailError::Empty);
        }
        if !is_valid_email(&normalized) {
            return Err(EmailError::Invalid);
        }
        Ok(Self(normalized))
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

    /// Returns the domain part of the email (after the @).
    ///
    /// Used for logging without recording the full address.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

/// Sanitize and lowercase raw email input.
///
/// This is the exact normalization applied before waitlist requests.
#[must_use]
pub fn normalize(s: &str) -> String {
    sanitize_input(s).to_lowercase()
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
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
    fn test_parse_normalizes() {
        let email = Email::parse("  First.Last@Domain.ORG ").unwrap();
        assert_eq!(email.as_str(), "first.last@domain.org");
    }

    #[test]
    fn test_parse_strips_angle_brackets() {
        let email = Email::parse("<user@example.com>").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("<>"), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(Email::parse("user@"), Err(EmailError::Invalid));
        assert_eq!(Email::parse("user@domain"), Err(EmailError::Invalid));
        assert_eq!(Email::parse("us er@domain.com"), Err(EmailError::Invalid));
    }

    #[test]
    fn test_domain() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Email = serde_json::from_str("\"USER@example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "user@example.com");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }

    #[test]
    fn test_from_str() {
        let email: Email = "user@example.com".parse().unwrap();
        assert_eq!(format!("{email}"), "user@example.com");
    }
}
