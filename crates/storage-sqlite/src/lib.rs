//! SQLite storage implementation for AdPulse.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `adpulse-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel
//! dependencies exist. All other crates are database-agnostic and work
//! with traits.
//!
//! ```text
//! core (domain + sync)
//!          │
//!          ▼
//! storage-sqlite (this crate)
//!          │
//!          ▼
//!      SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod campaigns;
pub mod connections;
pub mod credentials;
pub mod recommendations;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from adpulse-core for convenience
pub use adpulse_core::errors::{DatabaseError, Error, Result};
