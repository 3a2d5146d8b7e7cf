//! Czech trade register (RZP) access
//!
//! - `traits`: the [`RegistryClient`] seam the orchestrator depends on
//! - `client`: HTTP implementation against the public RZP API
//! - `wire`/`xml`: JSON and XML response mapping
//! - `address`: normalization of free-text addresses for address lookup

pub mod address;
pub mod client;
pub mod traits;
pub mod wire;
pub mod xml;

pub use address::searchable_address;
pub use client::RzpClient;
pub use traits::{RegistryClient, RegistryResult};
