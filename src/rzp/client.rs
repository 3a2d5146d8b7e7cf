//! RZP API client
//!
//! Session-bound HTTP client for the Czech trade register. One instance is
//! shared by every task of a search; reqwest's pool handles the concurrency.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::traits::{RegistryClient, RegistryResult};
use super::wire::{
    PersonSearchResponse, SessionResponse, SubjectSearchResponse, WireAddress,
};
use super::xml;
use crate::config::SearchConfig;
use crate::error::RegistryError;
use crate::query::{PersonQuery, SubjectKey, SubjectQuery};
use crate::types::{
    AddressMatch, DetailReference, PersonPage, StatementRecord, StatementReference,
    SubjectListing, SubjectPage,
};

const SESSION_PATH: &str = "/rzp/api-c/srv/session/v1/start";
const SUBJECTS_PATH: &str = "/rzp/api3-c/srv/vw/v1/subjekty";
const LISTING_PATH: &str = "/rzp/api3-c/srv/vw/v1/subjekty/isvs";
const PEOPLE_PATH: &str = "/rzp/api3-c/srv/vw/v1/osoby";
const ADDRESSES_PATH: &str = "/rzp/api3-c/srv/vw/v1/adresy";

/// How much of an error body ends up in the error message
const ERROR_BODY_CHARS: usize = 200;

/// RZP API client
pub struct RzpClient {
    http: Client,
    base_url: Url,
    session_id: String,
}

impl RzpClient {
    /// Build the HTTP client and open a registry session
    pub async fn connect(config: &SearchConfig) -> RegistryResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        let url = config.base_url.join(SESSION_PATH)?;
        let response = http
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::Session(e.to_string()))?;
        let response = check_status(response).await?;
        let session: SessionResponse = serde_json::from_str(&response.text().await?)?;

        if session.session_id.trim().is_empty() {
            return Err(RegistryError::Session(
                "registry returned an empty session id".to_string(),
            ));
        }
        tracing::debug!(session_id = %session.session_id, "Opened registry session");

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session_id: session.session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Attach the session headers every registry endpoint expects
    fn request(&self, url: Url) -> RequestBuilder {
        self.http
            .get(url)
            .header("Sesid", &self.session_id)
            .header("Accept-Language", "cs")
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> RegistryResult<T> {
        let url = self.base_url.join(path)?;
        tracing::debug!(url = %url, ?params, "Registry request");

        let response = self
            .request(url)
            .header("Accept", "application/json")
            .query(params)
            .send()
            .await?;
        let body = check_status(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_xml(&self, url: Url) -> RegistryResult<String> {
        tracing::debug!(url = %url, "Registry document request");

        let response = self
            .request(url)
            .header("Accept", "text/xml")
            .send()
            .await?;
        let bytes = check_status(response).await?.bytes().await?;
        xml::decode_document(&bytes)
    }
}

async fn check_status(response: Response) -> RegistryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RegistryError::Status {
        status,
        body: body.chars().take(ERROR_BODY_CHARS).collect(),
    })
}

/// Listing document URL; the reference is one escaped path segment
fn listing_url(base_url: &Url, reference: &DetailReference) -> RegistryResult<Url> {
    let mut url = base_url.join(LISTING_PATH)?;
    url.path_segments_mut()
        .map_err(|_| RegistryError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(&format!("{}.xml", reference.0));
    Ok(url)
}

fn subject_params(query: &SubjectQuery) -> Vec<(&'static str, String)> {
    // s-presvyber avoids the registry's minimum-length rule on the last word
    let mut params = vec![
        ("pouzeplatne", "true".to_string()),
        ("s-presvyber", "true".to_string()),
    ];
    match &query.key {
        SubjectKey::Name(name) => params.push(("s-obchjm", name.clone())),
        SubjectKey::Ico(ico) => params.push(("s-ico", ico.to_string())),
        SubjectKey::Person(person) => params.push(("s-idosoby", person.0.clone())),
        SubjectKey::Address(code) => params.push(("s-kodadresy", code.to_string())),
    }
    if let Some(partition) = query.partition {
        params.push(("s-role", partition.role_code().to_string()));
    }
    params
}

fn person_params(query: &PersonQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("pouzeplatne", "true".to_string())];
    if let Some(ref first_name) = query.first_name {
        params.push(("o-jmeno", first_name.clone()));
    }
    if let Some(ref surname) = query.surname {
        params.push(("o-prijmeni", surname.clone()));
    }
    if let Some(date) = query.birth_date {
        params.push(("o-datum", date.format("%Y-%m-%d").to_string()));
    }
    params
}

#[async_trait]
impl RegistryClient for RzpClient {
    async fn search_subject(&self, query: &SubjectQuery) -> RegistryResult<SubjectPage> {
        let response: SubjectSearchResponse =
            self.get_json(SUBJECTS_PATH, &subject_params(query)).await?;
        SubjectPage::try_from(response)
    }

    async fn search_person(&self, query: &PersonQuery) -> RegistryResult<PersonPage> {
        let response: PersonSearchResponse =
            self.get_json(PEOPLE_PATH, &person_params(query)).await?;
        PersonPage::try_from(response)
    }

    async fn search_address(&self, text: &str) -> RegistryResult<Vec<AddressMatch>> {
        let response: Vec<WireAddress> = self
            .get_json(ADDRESSES_PATH, &[("text", text.to_string())])
            .await?;
        Ok(response.into_iter().map(AddressMatch::from).collect())
    }

    async fn get_listing(&self, reference: &DetailReference) -> RegistryResult<SubjectListing> {
        let body = self.get_xml(listing_url(&self.base_url, reference)?).await?;
        xml::parse_listing(&body)
    }

    async fn get_statement(
        &self,
        reference: &StatementReference,
    ) -> RegistryResult<StatementRecord> {
        let body = self.get_xml(self.base_url.join(&reference.0)?).await?;
        xml::parse_statement(&body)
    }
}
