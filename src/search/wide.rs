//! Wide Search: one subject query per partition, run concurrently

use crate::error::{Result, SearchError};
use crate::query::{Partition, SubjectKey, SubjectQuery};
use crate::rzp::RegistryClient;
use crate::types::{Candidate, SubjectPage};

use super::scope::SearchScope;

/// Search subjects by `key` in every partition and concatenate the candidates
///
/// Truncation in either partition is `AmbiguousQuery`; the caller decides
/// whether that is fatal to the scope. Outright failures cancel the scope so
/// no further remote calls are issued under it.
pub async fn wide_search(
    client: &dyn RegistryClient,
    scope: &SearchScope,
    key: &SubjectKey,
) -> Result<Vec<Candidate>> {
    let [first, second] = Partition::ALL;
    let (first_page, second_page) = tokio::join!(
        search_partition(client, scope, key, first),
        search_partition(client, scope, key, second),
    );

    let first_page = first_page.map_err(|e| scope.resolve(e))?;
    let second_page = second_page.map_err(|e| scope.resolve(e))?;

    if first_page.truncated || second_page.truncated {
        tracing::debug!(
            key = %key,
            entrepreneur_truncated = first_page.truncated,
            statutory_truncated = second_page.truncated,
            "Subject search truncated"
        );
        return Err(SearchError::ambiguous(format!("subjects by {}", key)));
    }

    let mut candidates = first_page.candidates;
    candidates.extend(second_page.candidates);

    tracing::debug!(key = %key, count = candidates.len(), "Subject search complete");
    Ok(candidates)
}

async fn search_partition(
    client: &dyn RegistryClient,
    scope: &SearchScope,
    key: &SubjectKey,
    partition: Partition,
) -> Result<SubjectPage> {
    scope.ensure_active()?;

    let query = SubjectQuery::new(key.clone()).with_partition(partition);
    match client.search_subject(&query).await {
        Ok(page) => {
            tracing::debug!(
                partition = %partition,
                count = page.candidates.len(),
                truncated = page.truncated,
                "Partition searched"
            );
            Ok(page)
        }
        Err(e) => {
            let error = SearchError::from(e);
            scope.fail(error.clone());
            Err(error)
        }
    }
}
