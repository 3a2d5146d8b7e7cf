//! Query types for the registry search endpoints

use std::fmt;

use chrono::NaiveDate;

use crate::error::SearchError;
use crate::types::{AddressCode, Ico, PersonRef};

/// Legal-role partition a subject search has to be split across
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Natural person registered as an entrepreneur
    Entrepreneur,
    /// Representative of a statutory body
    StatutoryBody,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Entrepreneur, Partition::StatutoryBody];

    /// Value of the registry's role filter
    pub fn role_code(&self) -> &'static str {
        match self {
            Self::Entrepreneur => "P",
            Self::StatutoryBody => "S",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entrepreneur => write!(f, "entrepreneur"),
            Self::StatutoryBody => write!(f, "statutory body"),
        }
    }
}

/// The single primary discriminant of a subject search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectKey {
    Name(String),
    Ico(Ico),
    Person(PersonRef),
    Address(AddressCode),
}

impl SubjectKey {
    /// Name key, rejecting blank input
    pub fn name(name: impl Into<String>) -> Result<Self, SearchError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(SearchError::InvalidQuery(
                "subject name must not be empty".to_string(),
            ));
        }
        Ok(Self::Name(trimmed.to_string()))
    }

    pub fn ico(raw: &str) -> Result<Self, SearchError> {
        Ok(Self::Ico(Ico::parse(raw)?))
    }
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name '{}'", name),
            Self::Ico(ico) => write!(f, "identifier {}", ico),
            Self::Person(person) => write!(f, "person {}", person),
            Self::Address(code) => write!(f, "address code {}", code),
        }
    }
}

/// Subject search: exactly one key, optionally narrowed to one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectQuery {
    pub key: SubjectKey,
    pub partition: Option<Partition>,
}

impl SubjectQuery {
    pub fn new(key: SubjectKey) -> Self {
        Self {
            key,
            partition: None,
        }
    }

    pub fn with_partition(mut self, partition: Partition) -> Self {
        self.partition = Some(partition);
        self
    }
}

/// Person search by name parts and optional exact birth date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonQuery {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl PersonQuery {
    /// Split free text on its last whitespace boundary: the final token is the
    /// surname, everything before it the first name.
    ///
    /// Known limitation: multi-word surnames end up partly in the first name,
    /// and a single token is taken as a bare surname.
    pub fn from_free_text(text: &str) -> Result<Self, SearchError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((surname, rest)) = tokens.split_last() else {
            return Err(SearchError::InvalidQuery(
                "person name must not be empty".to_string(),
            ));
        };

        let first_name = if rest.is_empty() {
            None
        } else {
            Some(rest.join(" "))
        };

        Ok(Self {
            first_name,
            surname: Some(surname.to_string()),
            birth_date: None,
        })
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }
}

impl fmt::Display for PersonQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        write!(f, "person '{}'", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_first_and_last() {
        let q = PersonQuery::from_free_text("Jan Novák").unwrap();
        assert_eq!(q.first_name.as_deref(), Some("Jan"));
        assert_eq!(q.surname.as_deref(), Some("Novák"));
    }

    #[test]
    fn test_split_multiple_first_names() {
        let q = PersonQuery::from_free_text("  Jan  Karel   Novák ").unwrap();
        assert_eq!(q.first_name.as_deref(), Some("Jan Karel"));
        assert_eq!(q.surname.as_deref(), Some("Novák"));
    }

    #[test]
    fn test_single_token_is_surname() {
        let q = PersonQuery::from_free_text("novak").unwrap();
        assert_eq!(q.first_name, None);
        assert_eq!(q.surname.as_deref(), Some("novak"));
        assert_eq!(q.to_string(), "person 'novak'");
    }

    #[test]
    fn test_blank_rejected() {
        assert!(PersonQuery::from_free_text("   ").is_err());
        assert!(SubjectKey::name(" ").is_err());
    }

    #[test]
    fn test_partition_role_codes() {
        assert_eq!(Partition::Entrepreneur.role_code(), "P");
        assert_eq!(Partition::StatutoryBody.role_code(), "S");
    }

    proptest! {
        #[test]
        fn prop_surname_is_last_token(tokens in prop::collection::vec("[a-zA-Z]{1,8}", 1..5)) {
            let q = PersonQuery::from_free_text(&tokens.join(" ")).unwrap();
            prop_assert_eq!(q.surname.as_deref(), tokens.last().map(String::as_str));
            let expected_first = if tokens.len() > 1 {
                Some(tokens[..tokens.len() - 1].join(" "))
            } else {
                None
            };
            prop_assert_eq!(q.first_name, expected_first);
        }
    }
}
