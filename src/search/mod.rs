//! Search orchestration
//!
//! Every public search call owns one [`SearchScope`]; all tasks it spawns
//! share that scope, and the call returns either its complete result or the
//! first recorded failure.

pub mod address;
pub mod bounds;
pub mod deep;
pub mod person;
pub mod scope;
pub mod wide;

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::query::SubjectKey;
use crate::rzp::RegistryClient;
use crate::types::{AggregatedPerson, DetailRecord};

pub use address::{cross_reference, CrossReference, SkipReason};
pub use bounds::{born_after_for_max_age, born_before_for_min_age, BirthDateBounds};
pub use deep::deep_search;
pub use scope::SearchScope;
pub use wide::wide_search;

/// Entry point for person and subject searches against one registry client
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<dyn RegistryClient>,
    config: SearchConfig,
}

impl Aggregator {
    pub fn new(client: Arc<dyn RegistryClient>, config: SearchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find people by free-text name, enrich them, and keep those within `bounds`
    pub async fn search_people(
        &self,
        text: &str,
        bounds: BirthDateBounds,
    ) -> Result<Vec<AggregatedPerson>> {
        self.search_people_in(&SearchScope::new(), text, bounds).await
    }

    /// As [`Aggregator::search_people`], under a caller-owned scope
    pub async fn search_people_in(
        &self,
        scope: &SearchScope,
        text: &str,
        bounds: BirthDateBounds,
    ) -> Result<Vec<AggregatedPerson>> {
        person::search_people(
            self.client.clone(),
            scope,
            text,
            &bounds,
            self.config.deep_workers,
        )
        .await
    }

    /// Find subjects by name or identifier and fetch full detail for each
    pub async fn search_subjects(&self, key: SubjectKey) -> Result<Vec<DetailRecord>> {
        self.search_subjects_in(&SearchScope::new(), key).await
    }

    pub async fn search_subjects_in(
        &self,
        scope: &SearchScope,
        key: SubjectKey,
    ) -> Result<Vec<DetailRecord>> {
        let candidates = match wide_search(self.client.as_ref(), scope, &key).await {
            Ok(candidates) => candidates,
            Err(e) => {
                scope.fail(e.clone());
                return Err(scope.resolve(e));
            }
        };
        tracing::info!(key = %key, candidates = candidates.len(), "Subject search matched");

        deep_search(
            self.client.clone(),
            scope,
            candidates,
            self.config.deep_workers,
        )
        .await
        .map_err(|e: SearchError| scope.resolve(e))
    }
}
