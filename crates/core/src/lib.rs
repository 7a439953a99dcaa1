//! Savings Core - Domain entities, access façade, and storage traits.
//!
//! This crate contains the savings account domain model and the façade other
//! components use to read and write accounts. It is database-agnostic and defines
//! traits that are implemented by the `storage-sqlite` crate.

pub mod errors;
pub mod savings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
