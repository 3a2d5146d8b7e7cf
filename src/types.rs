//! Domain types shared by the registry client and the orchestrator

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

// =============================================================================
// Identifiers
// =============================================================================

/// Registry identification number (IČO): exactly eight ASCII digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ico(String);

impl Ico {
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        let raw = raw.trim();
        if raw.len() != 8 {
            return Err(SearchError::InvalidQuery(format!(
                "identifier '{}' must be 8 characters long",
                raw
            )));
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SearchError::InvalidQuery(format!(
                "identifier '{}' must be a number",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ico {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ico {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ico::parse(&value)
    }
}

impl From<Ico> for String {
    fn from(ico: Ico) -> Self {
        ico.0
    }
}

/// Opaque token addressing a subject's directory listing
///
/// Bound to the registry session that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailReference(pub String);

/// Path of the full statement document, embedded in a listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatementReference(pub String);

/// Opaque person handle returned by a person search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonRef(pub String);

/// Registry-internal handle of an address; only valid within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressCode(pub u64);

impl fmt::Display for DetailReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for PersonRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AddressCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Search results
// =============================================================================

/// Legal form tag of a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    /// Natural person doing business as an entrepreneur
    NaturalPerson,
    /// Any other legal form; the raw registry tag is kept
    Other(String),
}

impl SubjectKind {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "F" => Self::NaturalPerson,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_natural_person(&self) -> bool {
        matches!(self, Self::NaturalPerson)
    }
}

/// Lightweight match from a broad subject search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub ico: Ico,
    pub address: String,
    pub reference: DetailReference,
    pub kind: SubjectKind,
}

/// One page of a subject search
#[derive(Debug, Clone, Default)]
pub struct SubjectPage {
    pub candidates: Vec<Candidate>,
    /// The registry matched more records than it returned
    pub truncated: bool,
}

/// Person match from a person search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCandidate {
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub title_before_name: String,
    pub title_after_name: String,
    pub birth_date: Option<NaiveDate>,
    pub reference: PersonRef,
}

#[derive(Debug, Clone, Default)]
pub struct PersonPage {
    pub people: Vec<PersonCandidate>,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMatch {
    pub code: AddressCode,
    pub text: String,
}

// =============================================================================
// Detail records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_type: String,
    pub date_of_origin: NaiveDate,
    pub license_validity: String,
}

/// First hop of a detail fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectListing {
    pub ico: Ico,
    pub trades: Vec<Trade>,
    pub statement: StatementReference,
}

/// Second hop of a detail fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementRecord {
    pub ico: Option<Ico>,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub title_before_name: String,
    pub title_after_name: String,
    pub birth_date: Option<NaiveDate>,
    pub citizenship: String,
    pub address: String,
}

/// Enriched profile of one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub ico: Ico,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub title_before_name: String,
    pub title_after_name: String,
    pub birth_date: Option<NaiveDate>,
    pub citizenship: String,
    pub address: String,
    pub trades: Vec<Trade>,
}

impl DetailRecord {
    /// Join both hops, rejecting a statement that describes another subject
    pub fn assemble(
        listing: SubjectListing,
        statement: StatementRecord,
    ) -> Result<Self, SearchError> {
        if let Some(ref statement_ico) = statement.ico {
            if *statement_ico != listing.ico {
                return Err(SearchError::DataIntegrity(format!(
                    "statement for {} describes subject {}",
                    listing.ico, statement_ico
                )));
            }
        }

        Ok(Self {
            ico: listing.ico,
            full_name: statement.full_name,
            first_name: statement.first_name,
            last_name: statement.last_name,
            title_before_name: statement.title_before_name,
            title_after_name: statement.title_after_name,
            birth_date: statement.birth_date,
            citizenship: statement.citizenship,
            address: statement.address,
            trades: listing.trades,
        })
    }
}

// =============================================================================
// Aggregated output
// =============================================================================

/// A subject a person is linked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicSubject {
    pub name: String,
    pub address: String,
    pub ico: Ico,
}

impl From<&Candidate> for EconomicSubject {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            ico: candidate.ico.clone(),
        }
    }
}

/// Final output unit of a person search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedPerson {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub title_before_name: String,
    pub title_after_name: String,
    pub birth_date: Option<NaiveDate>,
    pub citizenship: Option<String>,
    pub address: Option<String>,
    pub subjects: Vec<EconomicSubject>,
    pub same_address_subjects: Vec<String>,
}

/// Unit flowing through result channels: a value or the failure that replaced it
pub type Outcome<T> = Result<T, SearchError>;
