//! The sync orchestrator.
//!
//! Pulls campaigns, daily metrics, and creatives from every connected ad
//! platform and persists them in canonical form. One connection failing
//! never stops the others.

pub mod sync_model;
pub mod sync_service;
pub mod sync_traits;


pub use sync_model::{SyncConfig, SyncOptions, SyncResult, SyncSummary};
pub use sync_service::SyncService;
pub use sync_traits::SyncServiceTrait;
