use async_trait::async_trait;

use crate::errors::Result;

use super::recommendations_model::{ExecutionUpdate, Recommendation};

/// Trait for recommendation persistence.
#[async_trait]
pub trait RecommendationRepositoryTrait: Send + Sync {
    async fn get_by_id(&self, recommendation_id: &str) -> Result<Recommendation>;

    async fn update_execution(
        &self,
        recommendation_id: &str,
        update: ExecutionUpdate,
    ) -> Result<Recommendation>;
}

/// Trait for recording recommendation execution outcomes.
#[async_trait]
pub trait RecommendationServiceTrait: Send + Sync {
    /// Record what happened when the pipeline executed a recommendation.
    ///
    /// Errors with `DatabaseError::NotFound` for unknown ids.
    async fn record_execution(
        &self,
        recommendation_id: &str,
        update: ExecutionUpdate,
    ) -> Result<Recommendation>;
}
