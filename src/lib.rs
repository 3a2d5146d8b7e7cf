//! Search and enrichment of people and economic subjects in the Czech trade
//! register (RZP).
//!
//! The registry spreads a person's profile over several endpoints. An
//! [`Aggregator`] runs the dependent queries concurrently, merges them into
//! [`AggregatedPerson`] records, and returns either the complete result or
//! exactly one error.
//!
//! ```ignore
//! let config = SearchConfig::from_env()?;
//! let client = Arc::new(RzpClient::connect(&config).await?);
//! let people = Aggregator::new(client, config)
//!     .search_people("Jan Novák", BirthDateBounds::default())
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod rzp;
pub mod search;
pub mod types;

pub use config::{ConfigError, SearchConfig};
pub use error::{RegistryError, Result, SearchError};
pub use query::{Partition, PersonQuery, SubjectKey, SubjectQuery};
pub use rzp::{RegistryClient, RzpClient};
pub use search::{Aggregator, BirthDateBounds, CrossReference, SearchScope, SkipReason};
pub use types::{
    AggregatedPerson, Candidate, DetailRecord, EconomicSubject, Ico, Outcome, PersonCandidate,
    Trade,
};
