//! Ad-platform connections and their sync-health lifecycle.

pub mod connections_model;
pub mod connections_service;
pub mod connections_traits;

pub use connections_model::{
    AdConnection, NewAdConnection, SyncStatus, TokenUpdate, TOKEN_REFRESH_MARGIN_SECS,
};
pub use connections_service::ConnectionsService;
pub use connections_traits::{AdConnectionRepositoryTrait, ConnectionsServiceTrait};
