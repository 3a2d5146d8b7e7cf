//! XML documents behind a subject's detail: the directory listing and the
//! statement it links to.
//!
//! Only the elements the aggregator reads are mapped; everything else in the
//! documents is ignored.

use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use serde::Deserialize;

use crate::error::RegistryError;
use crate::types::{Ico, StatementRecord, StatementReference, SubjectListing, Trade};

/// Dates inside registry XML documents
const XML_DATE_FORMAT: &str = "%d.%m.%Y";

/// `<X><Hodnota>...</Hodnota></X>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Value {
    #[serde(rename = "Hodnota", default)]
    pub value: String,
}

// =============================================================================
// Listing (first hop)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingDocument {
    #[serde(rename = "Subjekt", default)]
    pub subject: ListingSubject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingSubject {
    #[serde(rename = "Ico", default)]
    pub ico: Value,
    #[serde(rename = "ZivnostiSeznam", default)]
    pub trades: ListingTrades,
    #[serde(rename = "Odkazy", default)]
    pub links: ListingLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingTrades {
    #[serde(rename = "Zivnost", default)]
    pub items: Vec<ListingTrade>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingTrade {
    #[serde(rename = "Predmet", default)]
    pub subject: TradeSubject,
    #[serde(rename = "DatumVzniku", default)]
    pub date_of_origin: String,
    #[serde(rename = "PlatnostZivnosti", default)]
    pub validity: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeSubject {
    #[serde(rename = "HodnotaPredmetDruh", default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingLinks {
    #[serde(rename = "VypisXML", default)]
    pub statement_xml: String,
}

impl ListingDocument {
    pub fn into_listing(self) -> Result<SubjectListing, RegistryError> {
        let subject = self.subject;
        let ico = parse_ico(&subject.ico.value)?;

        let trades = subject
            .trades
            .items
            .into_iter()
            .map(|trade| {
                Ok(Trade {
                    trade_type: trade.subject.value.value.trim().to_string(),
                    date_of_origin: parse_date(&trade.date_of_origin, "trade origin")?,
                    license_validity: trade.validity.value.trim().to_string(),
                })
            })
            .collect::<Result<Vec<_>, RegistryError>>()?;

        let statement = subject.links.statement_xml.trim();
        if statement.is_empty() {
            return Err(RegistryError::InvalidData(format!(
                "listing of {} has no statement link",
                ico
            )));
        }

        Ok(SubjectListing {
            ico,
            trades,
            statement: StatementReference(statement.to_string()),
        })
    }
}

// =============================================================================
// Statement (second hop)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementDocument {
    #[serde(rename = "verweb", default)]
    pub body: StatementBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementBody {
    #[serde(rename = "PodnikatelDetail", default)]
    pub entrepreneur: EntrepreneurDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrepreneurDetail {
    #[serde(rename = "PodnikatelOsoba", default)]
    pub person: EntrepreneurPerson,
    #[serde(rename = "AdresaPodnikani", default)]
    pub business_address: BusinessAddress,
    #[serde(rename = "IdentifikacniCislo", default)]
    pub identifier: Identifier,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntrepreneurPerson {
    #[serde(rename = "ZucastnenaOsobaDetail", default)]
    pub detail: PersonDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonDetail {
    #[serde(rename = "JmenoPrijmeni", default)]
    pub full_name: Value,
    #[serde(rename = "DatumNarozeni", default)]
    pub birth_date: Value,
    #[serde(rename = "Obcanstvi", default)]
    pub citizenship: Value,
    #[serde(rename = "TitulPredJmenem", default)]
    pub title_before_name: Value,
    #[serde(rename = "Jmeno", default)]
    pub first_name: Value,
    #[serde(rename = "Prijmeni", default)]
    pub last_name: Value,
    #[serde(rename = "TitulZaJmenem", default)]
    pub title_after_name: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessAddress {
    #[serde(rename = "PlatnostAdresy", default)]
    pub validity: AddressValidity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressValidity {
    #[serde(rename = "ZmenaAdresy", default)]
    pub change: AddressChange,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressChange {
    #[serde(rename = "TextAdresy", default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Identifier {
    #[serde(rename = "PlatnostHodnoty", default)]
    pub validity: Value,
}

impl StatementDocument {
    pub fn into_record(self) -> Result<StatementRecord, RegistryError> {
        let detail = self.body.entrepreneur;
        let person = detail.person.detail;

        let ico = match detail.identifier.validity.value.trim() {
            "" => None,
            raw => Some(parse_ico(raw)?),
        };
        let birth_date = match person.birth_date.value.trim() {
            "" => None,
            raw => Some(parse_date(raw, "birth date")?),
        };

        Ok(StatementRecord {
            ico,
            full_name: person.full_name.value.trim().to_string(),
            first_name: person.first_name.value.trim().to_string(),
            last_name: person.last_name.value.trim().to_string(),
            title_before_name: person.title_before_name.value.trim().to_string(),
            title_after_name: person.title_after_name.value.trim().to_string(),
            birth_date,
            citizenship: person.citizenship.value.trim().to_string(),
            address: detail.business_address.validity.change.text.trim().to_string(),
        })
    }
}

// =============================================================================
// Decoding helpers
// =============================================================================

fn parse_ico(raw: &str) -> Result<Ico, RegistryError> {
    Ico::parse(raw).map_err(|e| RegistryError::InvalidData(e.to_string()))
}

fn parse_date(raw: &str, what: &str) -> Result<NaiveDate, RegistryError> {
    NaiveDate::parse_from_str(raw.trim(), XML_DATE_FORMAT)
        .map_err(|e| RegistryError::InvalidData(format!("{} '{}': {}", what, raw, e)))
}

/// Decode a document body using the charset named in its XML declaration
///
/// UTF-8 is assumed when the declaration names none; a byte-order mark wins
/// over the declaration.
pub fn decode_document(bytes: &[u8]) -> Result<String, RegistryError> {
    let encoding = declared_encoding(bytes).unwrap_or(UTF_8);
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(RegistryError::Decode(format!(
            "document is not valid {}",
            actual.name()
        )));
    }
    Ok(text.into_owned())
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let decl_end = head.find("?>")?;
    let decl = &head[..decl_end];
    let start = decl.find("encoding=")? + "encoding=".len();
    let rest = &decl[start..];
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let label = rest[1..].split(quote).next()?;
    Encoding::for_label(label.trim().as_bytes())
}

pub fn parse_listing(body: &str) -> Result<SubjectListing, RegistryError> {
    let document: ListingDocument = quick_xml::de::from_str(body)?;
    document.into_listing()
}

pub fn parse_statement(body: &str) -> Result<StatementRecord, RegistryError> {
    let document: StatementDocument = quick_xml::de::from_str(body)?;
    document.into_record()
}
