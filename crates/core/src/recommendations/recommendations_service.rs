use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::errors::Result;

use super::recommendations_model::{ExecutionUpdate, Recommendation};
use super::recommendations_traits::{RecommendationRepositoryTrait, RecommendationServiceTrait};

pub struct RecommendationService {
    repository: Arc<dyn RecommendationRepositoryTrait>,
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn RecommendationRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl RecommendationServiceTrait for RecommendationService {
    async fn record_execution(
        &self,
        recommendation_id: &str,
        update: ExecutionUpdate,
    ) -> Result<Recommendation> {
        // Existence check first so unknown ids surface as NotFound.
        let _ = self.repository.get_by_id(recommendation_id).await?;
        let updated = self
            .repository
            .update_execution(recommendation_id, update)
            .await?;
        info!(
            "Recorded execution for recommendation {}: {}",
            updated.id,
            updated.execution_status.as_deref().unwrap_or("unknown")
        );
        Ok(updated)
    }
}
