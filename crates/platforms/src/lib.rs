//! AdPulse Platforms Crate
//!
//! Platform-agnostic ad-platform access for the AdPulse sync engine.
//!
//! # Overview
//!
//! This crate supports:
//! - OAuth code exchange and token refresh against each ad platform
//! - Listing ad accounts reachable by a token
//! - Fetching campaigns and daily metrics with full pagination
//! - Normalizing every platform payload into canonical shapes at the boundary
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  Sync Engine     | --> |  ClientFactory   |  (platform tag -> client)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | AdPlatformClient |  (google, meta, linkedin, tiktok)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | Campaign/Metrics |  (canonical records)
//!                          +------------------+
//! ```
//!
//! Raw upstream shapes never leave a platform module: each module owns its
//! private serde response structs and a `normalize` submodule of pure
//! mapping functions into the canonical [`models`] types.
//!
//! # Core Types
//!
//! - [`AdPlatform`] - Platform tag ("google", "meta", "linkedin", "tiktok")
//! - [`AdPlatformClient`] - Common capability set every platform implements
//! - [`Campaign`], [`MetricsRecord`], [`Creative`] - Canonical records
//! - [`TokenSet`] - Result of a code exchange or token refresh
//! - [`PlatformAppConfig`] - Per-company OAuth app material

pub mod client;
pub mod errors;
pub mod models;

pub use client::{client_for, AdPlatformClient, ClientFactory, DefaultClientFactory};
pub use errors::PlatformError;
pub use models::{
    select_account, AdAccount, AdPlatform, Campaign, CampaignStatus, Creative, DateRange,
    MetricsRecord, PlatformAppConfig, TokenSet,
};
