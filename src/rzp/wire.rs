//! JSON response types of the registry search API
//!
//! Field names follow the registry's Czech JSON keys; conversion into domain
//! types validates identifiers and dates on the way in.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::RegistryError;
use crate::types::{
    AddressCode, AddressMatch, Candidate, DetailReference, Ico, PersonCandidate, PersonPage,
    PersonRef, SubjectKind, SubjectPage,
};

/// ISO dates in JSON payloads
const JSON_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sesid")]
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectSearchResponse {
    #[serde(rename = "seznamNeniKompletni", default)]
    pub more_possible_matches: bool,
    #[serde(rename = "subjekty", default)]
    pub subjects: Vec<WireSubject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSubject {
    #[serde(rename = "nazev", default)]
    pub name: String,
    #[serde(rename = "ico", default)]
    pub ico: String,
    #[serde(rename = "sidlo", default)]
    pub address: String,
    #[serde(rename = "ssarzp", default)]
    pub detail_ref: String,
    #[serde(rename = "typSubjektu", default)]
    pub subject_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonSearchResponse {
    #[serde(rename = "seznamNeniKompletni", default)]
    pub more_possible_matches: bool,
    #[serde(rename = "osoby", default)]
    pub people: Vec<WirePerson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePerson {
    #[serde(rename = "jmeno", default)]
    pub first_name: String,
    #[serde(rename = "prijmeni", default)]
    pub last_name: String,
    #[serde(rename = "zobrazeneJmeno", default)]
    pub display_name: String,
    #[serde(rename = "titulPred", default)]
    pub title_before_name: String,
    #[serde(rename = "titulZa", default)]
    pub title_after_name: String,
    #[serde(rename = "datum", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "idOsoby")]
    pub person_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAddress {
    #[serde(rename = "kod")]
    pub code: u64,
    #[serde(rename = "text", default)]
    pub text: String,
}

impl TryFrom<WireSubject> for Candidate {
    type Error = RegistryError;

    fn try_from(subject: WireSubject) -> Result<Self, Self::Error> {
        let ico = Ico::parse(&subject.ico).map_err(|_| {
            RegistryError::InvalidData(format!(
                "subject '{}' has malformed identifier '{}'",
                subject.name, subject.ico
            ))
        })?;
        if subject.detail_ref.trim().is_empty() {
            return Err(RegistryError::InvalidData(format!(
                "subject {} has no detail reference",
                ico
            )));
        }

        Ok(Candidate {
            name: subject.name,
            ico,
            address: subject.address,
            reference: DetailReference(subject.detail_ref),
            kind: SubjectKind::parse(&subject.subject_type),
        })
    }
}

impl TryFrom<SubjectSearchResponse> for SubjectPage {
    type Error = RegistryError;

    fn try_from(response: SubjectSearchResponse) -> Result<Self, Self::Error> {
        let candidates = response
            .subjects
            .into_iter()
            .map(Candidate::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SubjectPage {
            candidates,
            truncated: response.more_possible_matches,
        })
    }
}

impl TryFrom<WirePerson> for PersonCandidate {
    type Error = RegistryError;

    fn try_from(person: WirePerson) -> Result<Self, Self::Error> {
        let birth_date = match person.birth_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw, JSON_DATE_FORMAT).map_err(|e| {
                    RegistryError::InvalidData(format!(
                        "birth date '{}' of {}: {}",
                        raw, person.display_name, e
                    ))
                })?,
            ),
        };

        Ok(PersonCandidate {
            first_name: person.first_name,
            last_name: person.last_name,
            display_name: person.display_name,
            title_before_name: person.title_before_name,
            title_after_name: person.title_after_name,
            birth_date,
            reference: PersonRef(person.person_id),
        })
    }
}

impl TryFrom<PersonSearchResponse> for PersonPage {
    type Error = RegistryError;

    fn try_from(response: PersonSearchResponse) -> Result<Self, Self::Error> {
        let people = response
            .people
            .into_iter()
            .map(PersonCandidate::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PersonPage {
            people,
            truncated: response.more_possible_matches,
        })
    }
}

impl From<WireAddress> for AddressMatch {
    fn from(address: WireAddress) -> Self {
        AddressMatch {
            code: AddressCode(address.code),
            text: address.text,
        }
    }
}
