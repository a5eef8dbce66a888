//! Recommendation execution tracking.
//!
//! Recommendations themselves are produced by an external automation
//! pipeline; this module only records their execution outcomes when the
//! pipeline reports back over the webhook.

pub mod recommendations_model;
pub mod recommendations_service;
pub mod recommendations_traits;

pub use recommendations_model::{ExecutionUpdate, Recommendation};
pub use recommendations_service::RecommendationService;
pub use recommendations_traits::{RecommendationRepositoryTrait, RecommendationServiceTrait};
