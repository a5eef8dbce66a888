//! Normalized campaign, metrics, and creative storage models.

pub mod campaigns_model;
pub mod campaigns_traits;

pub use campaigns_model::{StoredCampaign, StoredCreative, StoredMetricsRecord};
pub use campaigns_traits::{CampaignRepositoryTrait, MetricsQuery};
