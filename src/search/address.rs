//! Address Cross-Reference: subjects registered at the same address

use serde::Serialize;

use crate::error::{Result, SearchError};
use crate::query::SubjectKey;
use crate::rzp::{searchable_address, RegistryClient};

use super::scope::SearchScope;
use super::wide::wide_search;

/// Why a cross-reference was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The address has no searchable street and municipality part
    Unparseable,
    NoMatch,
    MultipleMatches(usize),
    /// Too many subjects at the address to list
    Truncated,
}

/// Result of cross-referencing one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CrossReference {
    /// Names of every subject at the address, the source subject included
    Resolved(Vec<String>),
    /// Degraded enrichment; the person is still reported
    Skipped(SkipReason),
}

impl CrossReference {
    pub fn names(&self) -> &[String] {
        match self {
            Self::Resolved(names) => names,
            Self::Skipped(_) => &[],
        }
    }

    pub fn into_names(self) -> Vec<String> {
        match self {
            Self::Resolved(names) => names,
            Self::Skipped(_) => Vec::new(),
        }
    }
}

/// Resolve `address` to one registry address and list the subjects there
///
/// Never retries. Remote failures are returned as errors; every other
/// shortfall is a [`CrossReference::Skipped`].
pub async fn cross_reference(
    client: &dyn RegistryClient,
    scope: &SearchScope,
    address: &str,
) -> Result<CrossReference> {
    let Some(searchable) = searchable_address(address) else {
        tracing::warn!(address = %address, "Address not searchable, skipping cross-reference");
        return Ok(CrossReference::Skipped(SkipReason::Unparseable));
    };

    scope.ensure_active()?;
    let matches = match client.search_address(&searchable).await {
        Ok(matches) => matches,
        Err(e) => {
            let error = SearchError::from(e);
            scope.fail(error.clone());
            return Err(error);
        }
    };

    let code = match matches.as_slice() {
        [only] => only.code,
        [] => {
            tracing::warn!(address = %searchable, "Address not found, skipping cross-reference");
            return Ok(CrossReference::Skipped(SkipReason::NoMatch));
        }
        many => {
            tracing::warn!(
                address = %searchable,
                matches = many.len(),
                "Address is ambiguous, skipping cross-reference"
            );
            return Ok(CrossReference::Skipped(SkipReason::MultipleMatches(many.len())));
        }
    };

    match wide_search(client, scope, &SubjectKey::Address(code)).await {
        Ok(subjects) => {
            tracing::debug!(address = %searchable, subjects = subjects.len(), "Address cross-referenced");
            Ok(CrossReference::Resolved(
                subjects.into_iter().map(|subject| subject.name).collect(),
            ))
        }
        Err(e) if e.is_ambiguous() => {
            tracing::warn!(address = %searchable, "Too many subjects at address, skipping cross-reference");
            Ok(CrossReference::Skipped(SkipReason::Truncated))
        }
        Err(e) => Err(e),
    }
}
