//! Person Aggregator
//!
//! One task per matched person:
//!
//! ```text
//! Pending -> SubjectsFetched -> (detail skipped | DetailFetched -> (address resolved | skipped)) -> Done
//! ```
//!
//! A failure before `Done` cancels the whole call.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{Result, SearchError};
use crate::query::{PersonQuery, SubjectKey};
use crate::rzp::RegistryClient;
use crate::types::{
    AggregatedPerson, Candidate, DetailRecord, EconomicSubject, Outcome, PersonCandidate,
};

use super::address::{cross_reference, CrossReference};
use super::bounds::BirthDateBounds;
use super::deep::deep_search;
use super::scope::SearchScope;
use super::wide::wide_search;

/// Search people by free-text name and enrich every match
///
/// Results keep the registry's person order; `bounds` filters them once
/// enrichment is complete.
pub async fn search_people(
    client: Arc<dyn RegistryClient>,
    scope: &SearchScope,
    text: &str,
    bounds: &BirthDateBounds,
    deep_workers: usize,
) -> Result<Vec<AggregatedPerson>> {
    let query = PersonQuery::from_free_text(text)?;

    scope.ensure_active()?;
    let page = match client.search_person(&query).await {
        Ok(page) => page,
        Err(e) => {
            let error = SearchError::from(e);
            scope.fail(error.clone());
            return Err(error);
        }
    };

    if page.truncated {
        let error = SearchError::ambiguous(query.to_string());
        scope.fail(error.clone());
        return Err(error);
    }

    let total = page.people.len();
    tracing::info!(query = %query, people = total, "Person search matched");
    if total == 0 {
        return Ok(Vec::new());
    }

    // exactly one outcome per task, so the buffer never fills
    let (tx, mut rx) = mpsc::channel::<(usize, Outcome<AggregatedPerson>)>(total);
    let mut tasks = JoinSet::new();

    for (index, person) in page.people.into_iter().enumerate() {
        let client = client.clone();
        let scope = scope.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            let outcome = enrich_person(client, &scope, person, deep_workers).await;
            if let Err(ref e) = outcome {
                scope.fail(e.clone());
            }
            // the collector drains until every sender is gone
            let _ = tx.send((index, outcome)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<AggregatedPerson>> = vec![None; total];
    let mut received = 0;
    let mut first_error: Option<SearchError> = None;

    while let Some((index, outcome)) = rx.recv().await {
        received += 1;
        match outcome {
            Ok(person) => slots[index] = Some(person),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            let error = SearchError::TaskPanicked(format!("person task: {}", e));
            scope.fail(error.clone());
            first_error.get_or_insert(error);
        }
    }

    if received != total && first_error.is_none() {
        let error = SearchError::TaskPanicked(format!(
            "{} of {} person tasks delivered no outcome",
            total - received,
            total
        ));
        scope.fail(error.clone());
        first_error = Some(error);
    }

    if let Some(error) = first_error {
        return Err(scope.resolve(error));
    }

    let people: Vec<AggregatedPerson> = slots
        .into_iter()
        .flatten()
        .filter(|person| bounds.contains(person.birth_date))
        .collect();

    tracing::info!(people = people.len(), matched = total, "Person search complete");
    Ok(people)
}

/// Walk one person through subject lookup, detail fetch and cross-reference
async fn enrich_person(
    client: Arc<dyn RegistryClient>,
    scope: &SearchScope,
    person: PersonCandidate,
    deep_workers: usize,
) -> Outcome<AggregatedPerson> {
    let key = SubjectKey::Person(person.reference.clone());
    let subjects = wide_search(client.as_ref(), scope, &key).await?;

    let own: Vec<Candidate> = subjects
        .iter()
        .filter(|subject| subject.kind.is_natural_person())
        .cloned()
        .collect();

    let (detail, cross) = match own.first().map(|subject| subject.ico.clone()) {
        None => {
            tracing::debug!(person = %person.display_name, "No natural-person subject, detail skipped");
            (None, None)
        }
        Some(primary_ico) => {
            if own.len() > 1 {
                tracing::debug!(
                    person = %person.display_name,
                    subjects = own.len(),
                    ico = %primary_ico,
                    "Several natural-person subjects, using the first"
                );
            }
            let records = deep_search(client.clone(), scope, own, deep_workers).await?;
            let detail = records.into_iter().find(|record| record.ico == primary_ico);

            let cross = match detail {
                Some(ref record) => {
                    Some(cross_reference(client.as_ref(), scope, &record.address).await?)
                }
                None => None,
            };
            (detail, cross)
        }
    };

    Ok(assemble(person, &subjects, detail, cross))
}

fn assemble(
    person: PersonCandidate,
    subjects: &[Candidate],
    detail: Option<DetailRecord>,
    cross: Option<CrossReference>,
) -> AggregatedPerson {
    let full_name = if person.display_name.trim().is_empty() {
        format!("{} {}", person.first_name, person.last_name)
            .trim()
            .to_string()
    } else {
        person.display_name
    };
    let birth_date = person
        .birth_date
        .or_else(|| detail.as_ref().and_then(|record| record.birth_date));
    let (citizenship, address) = match detail {
        Some(record) => (
            Some(record.citizenship).filter(|c| !c.is_empty()),
            Some(record.address).filter(|a| !a.is_empty()),
        ),
        None => (None, None),
    };

    AggregatedPerson {
        full_name,
        first_name: person.first_name,
        last_name: person.last_name,
        title_before_name: person.title_before_name,
        title_after_name: person.title_after_name,
        birth_date,
        citizenship,
        address,
        subjects: subjects.iter().map(EconomicSubject::from).collect(),
        same_address_subjects: cross.map(CrossReference::into_names).unwrap_or_default(),
    }
}
