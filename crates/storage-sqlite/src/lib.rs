//! SQLite storage implementation for savings accounts.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `savings-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The savings account repository and its single-writer actor
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist. The core crate
//! is database-agnostic and works with traits.
//!
//! ```text
//!      core (domain, façade)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod savings;

// Re-export database utilities
pub use db::{
    checkpoint, create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer,
    DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use savings::SavingsAccountRepository;

// Re-export from savings-core for convenience
pub use savings_core::errors::{DatabaseError, Error, Result};
