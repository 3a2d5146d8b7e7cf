//! Scripted in-memory registry for orchestration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use rzp_aggregator::error::RegistryError;
use rzp_aggregator::query::{Partition, PersonQuery, SubjectKey, SubjectQuery};
use rzp_aggregator::rzp::{RegistryClient, RegistryResult};
use rzp_aggregator::types::{
    AddressCode, AddressMatch, Candidate, DetailReference, Ico, PersonCandidate, PersonPage,
    PersonRef, StatementRecord, StatementReference, SubjectKind, SubjectListing, SubjectPage,
};

/// Scripted response: a value or a remote failure with this message
pub type Scripted<T> = Result<T, String>;

/// Counters shared with the test after the registry is handed to the aggregator
#[derive(Debug, Default)]
pub struct CallStats {
    pub person_searches: AtomicUsize,
    pub subject_searches: AtomicUsize,
    pub address_searches: AtomicUsize,
    pub listings: AtomicUsize,
    pub statements: AtomicUsize,
    /// Detail hops currently running
    pub detail_in_flight: AtomicUsize,
    pub max_detail_in_flight: AtomicUsize,
    /// Calls of any kind currently running
    pub in_flight: AtomicUsize,
}

impl CallStats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn detail_fetches(&self) -> usize {
        Self::get(&self.listings)
    }

    pub fn max_concurrent_details(&self) -> usize {
        Self::get(&self.max_detail_in_flight)
    }

    pub fn idle(&self) -> bool {
        Self::get(&self.in_flight) == 0
    }
}

struct InFlight<'a> {
    stats: &'a CallStats,
    detail: bool,
}

impl<'a> InFlight<'a> {
    fn call(stats: &'a CallStats) -> Self {
        stats.in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            stats,
            detail: false,
        }
    }

    fn detail(stats: &'a CallStats) -> Self {
        stats.in_flight.fetch_add(1, Ordering::SeqCst);
        let now = stats.detail_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_detail_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            stats,
            detail: true,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.detail {
            self.stats.detail_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Registry whose every answer is set up front by the test
#[derive(Default)]
pub struct ScriptedRegistry {
    people: HashMap<String, Scripted<PersonPage>>,
    subjects: HashMap<(String, Partition), Scripted<SubjectPage>>,
    addresses: HashMap<String, Scripted<Vec<AddressMatch>>>,
    listings: HashMap<String, Scripted<SubjectListing>>,
    statements: HashMap<String, Scripted<StatementRecord>>,
    listing_delays: HashMap<String, Duration>,
    delay: Duration,
    stats: Arc<CallStats>,
}

impl ScriptedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latency of every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn stats(&self) -> Arc<CallStats> {
        self.stats.clone()
    }

    /// Answer a person search for `surname`
    pub fn with_people(mut self, surname: &str, page: Scripted<PersonPage>) -> Self {
        self.people.insert(surname.to_string(), page);
        self
    }

    /// Answer a subject search; unscripted partitions return an empty page
    pub fn with_subjects(
        mut self,
        key: &SubjectKey,
        partition: Partition,
        page: Scripted<SubjectPage>,
    ) -> Self {
        self.subjects.insert((key.to_string(), partition), page);
        self
    }

    pub fn with_address(mut self, text: &str, matches: Scripted<Vec<AddressMatch>>) -> Self {
        self.addresses.insert(text.to_string(), matches);
        self
    }

    /// Script both detail hops of `reference`
    pub fn with_detail(
        mut self,
        reference: &str,
        listing: Scripted<SubjectListing>,
        statement: Scripted<StatementRecord>,
    ) -> Self {
        let statement_path = match listing {
            Ok(ref listing) => listing.statement.0.clone(),
            Err(_) => statement_path(reference),
        };
        self.listings.insert(reference.to_string(), listing);
        self.statements.insert(statement_path, statement);
        self
    }

    /// Script a natural person's subject: listing and statement agree on `ico`
    pub fn with_person_detail(
        self,
        reference: &str,
        ico: &str,
        birth_date: Option<NaiveDate>,
        address: &str,
    ) -> Self {
        self.with_detail(
            reference,
            Ok(listing(ico, reference)),
            Ok(statement(ico, birth_date, address)),
        )
    }

    /// Extra latency for one listing fetch
    pub fn with_listing_delay(mut self, reference: &str, delay: Duration) -> Self {
        self.listing_delays.insert(reference.to_string(), delay);
        self
    }

    pub fn into_client(self) -> Arc<dyn RegistryClient> {
        Arc::new(self)
    }

    async fn latency(&self, extra: Option<&Duration>) {
        let total = self.delay + extra.copied().unwrap_or_default();
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }
}

fn answer<T: Clone>(scripted: Option<&Scripted<T>>, what: &str) -> RegistryResult<T> {
    match scripted {
        Some(Ok(value)) => Ok(value.clone()),
        Some(Err(message)) => Err(remote(message)),
        None => Err(remote(&format!("unscripted {}", what))),
    }
}

pub fn remote(message: &str) -> RegistryError {
    RegistryError::Status {
        status: reqwest::StatusCode::BAD_GATEWAY,
        body: message.to_string(),
    }
}

#[async_trait]
impl RegistryClient for ScriptedRegistry {
    async fn search_subject(&self, query: &SubjectQuery) -> RegistryResult<SubjectPage> {
        let _guard = InFlight::call(&self.stats);
        self.stats.subject_searches.fetch_add(1, Ordering::SeqCst);
        self.latency(None).await;

        let partition = query.partition.expect("subject searches are partitioned");
        match self.subjects.get(&(query.key.to_string(), partition)) {
            None => Ok(SubjectPage::default()),
            scripted => answer(scripted, "subject search"),
        }
    }

    async fn search_person(&self, query: &PersonQuery) -> RegistryResult<PersonPage> {
        let _guard = InFlight::call(&self.stats);
        self.stats.person_searches.fetch_add(1, Ordering::SeqCst);
        self.latency(None).await;

        let surname = query.surname.clone().unwrap_or_default();
        answer(self.people.get(&surname), "person search")
    }

    async fn search_address(&self, text: &str) -> RegistryResult<Vec<AddressMatch>> {
        let _guard = InFlight::call(&self.stats);
        self.stats.address_searches.fetch_add(1, Ordering::SeqCst);
        self.latency(None).await;

        answer(self.addresses.get(text), "address search")
    }

    async fn get_listing(&self, reference: &DetailReference) -> RegistryResult<SubjectListing> {
        let _guard = InFlight::detail(&self.stats);
        self.stats.listings.fetch_add(1, Ordering::SeqCst);
        self.latency(self.listing_delays.get(&reference.0)).await;

        answer(self.listings.get(&reference.0), "listing")
    }

    async fn get_statement(
        &self,
        reference: &StatementReference,
    ) -> RegistryResult<StatementRecord> {
        let _guard = InFlight::detail(&self.stats);
        self.stats.statements.fetch_add(1, Ordering::SeqCst);
        self.latency(None).await;

        answer(self.statements.get(&reference.0), "statement")
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn ico(raw: &str) -> Ico {
    Ico::parse(raw).unwrap()
}

pub fn statement_path(reference: &str) -> String {
    format!("/vypis/{}.xml", reference)
}

pub fn candidate(name: &str, ico_raw: &str, reference: &str, natural_person: bool) -> Candidate {
    Candidate {
        name: name.to_string(),
        ico: ico(ico_raw),
        address: "Dlouhá 12, 110 00, Praha 1".to_string(),
        reference: DetailReference(reference.to_string()),
        kind: if natural_person {
            SubjectKind::NaturalPerson
        } else {
            SubjectKind::Other("P".to_string())
        },
    }
}

pub fn person(first: &str, last: &str, reference: &str, birth_date: Option<NaiveDate>) -> PersonCandidate {
    PersonCandidate {
        first_name: first.to_string(),
        last_name: last.to_string(),
        display_name: format!("{} {}", first, last),
        title_before_name: String::new(),
        title_after_name: String::new(),
        birth_date,
        reference: PersonRef(reference.to_string()),
    }
}

pub fn page(candidates: Vec<Candidate>) -> Scripted<SubjectPage> {
    Ok(SubjectPage {
        candidates,
        truncated: false,
    })
}

pub fn truncated_page(candidates: Vec<Candidate>) -> Scripted<SubjectPage> {
    Ok(SubjectPage {
        candidates,
        truncated: true,
    })
}

pub fn people(people: Vec<PersonCandidate>) -> Scripted<PersonPage> {
    Ok(PersonPage {
        people,
        truncated: false,
    })
}

pub fn listing(ico_raw: &str, reference: &str) -> SubjectListing {
    SubjectListing {
        ico: ico(ico_raw),
        trades: vec![],
        statement: StatementReference(statement_path(reference)),
    }
}

pub fn statement(ico_raw: &str, birth_date: Option<NaiveDate>, address: &str) -> StatementRecord {
    StatementRecord {
        ico: Some(ico(ico_raw)),
        full_name: "Jan Novák".to_string(),
        first_name: "Jan".to_string(),
        last_name: "Novák".to_string(),
        birth_date,
        citizenship: "Česká republika".to_string(),
        address: address.to_string(),
        ..Default::default()
    }
}

pub fn address_match(code: u64, text: &str) -> AddressMatch {
    AddressMatch {
        code: AddressCode(code),
        text: text.to_string(),
    }
}

pub fn person_key(reference: &str) -> SubjectKey {
    SubjectKey::Person(PersonRef(reference.to_string()))
}

pub fn address_key(code: u64) -> SubjectKey {
    SubjectKey::Address(AddressCode(code))
}
