//! Email address type used as the login identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input is empty after trimming.
    #[error("email cannot be empty")]
    Empty,
    /// The input is longer than [`Email::MAX_LENGTH`].
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not split into exactly one local part and one domain.
    #[error("email must contain exactly one @ symbol")]
    Malformed,
    /// Either side of the @ is empty.
    #[error("email must have text on both sides of the @ symbol")]
    MissingPart,
}

/// A login email address.
///
/// Surrounding whitespace is trimmed and the domain is lowercased so the
/// same account always produces the same identifier, whether it is typed
/// into the CLI or returned by the backend.
///
/// ```
/// use shopfront_core::Email;
///
/// let email = Email::parse("  Shopper@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "Shopper@example.com");
///
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse and normalize an `Email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, too long, or does not
    /// have exactly one `@` with text on both sides.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut parts = trimmed.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(EmailError::Malformed);
        };
        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::MissingPart);
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
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

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_domain_only() {
        let email = Email::parse("Jane.Doe@Shop.Example").unwrap();
        assert_eq!(email.as_str(), "Jane.Doe@shop.example");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_rejects_wrong_at_count() {
        assert_eq!(Email::parse("plain"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("a@b@c"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_parse_rejects_missing_side() {
        assert_eq!(Email::parse("@shop.example"), Err(EmailError::MissingPart));
        assert_eq!(Email::parse("jane@"), Err(EmailError::MissingPart));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let email: Email = serde_json::from_str("\"jane@SHOP.example\"").unwrap();
        assert_eq!(email.as_str(), "jane@shop.example");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
