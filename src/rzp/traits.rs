//! RegistryClient trait
//!
//! The seam between the orchestrator and the registry. The orchestrator never
//! builds requests itself; it only sees typed pages, records and failures.

use async_trait::async_trait;

use crate::error::{RegistryError, SearchError};
use crate::query::{PersonQuery, SubjectQuery};
use crate::types::{
    AddressMatch, DetailRecord, DetailReference, PersonPage, StatementRecord, StatementReference,
    SubjectListing, SubjectPage,
};

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Request/response access to the trade register
///
/// Each call is one remote round trip with its own deadline. Implementations
/// must be safe to share between concurrently running tasks.
///
/// # Implementation Notes
///
/// - Report "more matches exist" through the page's `truncated` flag, never by
///   silently dropping it
/// - An empty result is `Ok(vec![])`, not an error
/// - Unparseable dates and identifiers are `RegistryError::InvalidData`
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Search economic subjects
    async fn search_subject(&self, query: &SubjectQuery) -> RegistryResult<SubjectPage>;

    /// Search people by name parts and birth date
    async fn search_person(&self, query: &PersonQuery) -> RegistryResult<PersonPage>;

    /// Resolve free-text (already normalized) address to registry address handles
    async fn search_address(&self, text: &str) -> RegistryResult<Vec<AddressMatch>>;

    /// First detail hop: the subject's directory listing
    async fn get_listing(&self, reference: &DetailReference) -> RegistryResult<SubjectListing>;

    /// Second detail hop: the statement the listing points at
    async fn get_statement(
        &self,
        reference: &StatementReference,
    ) -> RegistryResult<StatementRecord>;

    /// Both detail hops in one call
    async fn get_detail(&self, reference: &DetailReference) -> RegistryResult<DetailRecord> {
        let listing = self.get_listing(reference).await?;
        let statement = self.get_statement(&listing.statement).await?;
        DetailRecord::assemble(listing, statement).map_err(|e| match e {
            SearchError::DataIntegrity(message) => RegistryError::InvalidData(message),
            other => RegistryError::InvalidData(other.to_string()),
        })
    }
}
