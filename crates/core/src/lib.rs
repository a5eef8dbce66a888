//! AdPulse Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for the AdPulse sync
//! engine. It is database-agnostic and defines repository traits that
//! are implemented by the `storage-sqlite` crate.

pub mod auth_flow;
pub mod campaigns;
pub mod connections;
pub mod credentials;
pub mod errors;
pub mod recommendations;
pub mod sync;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
