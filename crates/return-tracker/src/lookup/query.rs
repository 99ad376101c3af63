use super::LookupError;
use crate::queue::Record;

/// A validated status search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Matches the record email exactly, ignoring case.
    Email(String),
    /// Matches the full record name exactly, ignoring case.
    FullName(String),
}

impl SearchQuery {
    /// Validates raw user input. Anything containing `@` is an email search; otherwise at least a
    /// first and last name are required.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LookupError::Validation(
                "Please enter a name or email address.".to_string(),
            ));
        }

        let needle = trimmed.to_lowercase();
        if trimmed.contains('@') {
            return Ok(Self::Email(needle));
        }

        if trimmed.split_whitespace().count() < 2 {
            return Err(LookupError::Validation(
                "Please enter both first and last name (e.g., \"John Smith\").".to_string(),
            ));
        }
        Ok(Self::FullName(needle))
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Email(email) => {
                !record.email.is_empty() && record.email.to_lowercase() == *email
            }
            Self::FullName(name) => record.name.to_lowercase() == *name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(value) | Self::FullName(value) => value,
        }
    }
}
