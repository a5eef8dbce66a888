use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use adpulse_core::recommendations::{
    ExecutionUpdate, Recommendation, RecommendationRepositoryTrait,
};
use adpulse_core::Result;

use super::model::RecommendationDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::recommendations;

pub struct RecommendationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RecommendationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        RecommendationRepository { pool, writer }
    }

    /// Insert a recommendation row directly.
    ///
    /// Recommendations normally arrive through the external pipeline's
    /// own writes; this exists for seeding and tests.
    pub async fn insert(&self, recommendation: Recommendation) -> Result<Recommendation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Recommendation> {
                let now = Utc::now().to_rfc3339();
                let row = RecommendationDB {
                    id: recommendation.id,
                    company_id: recommendation.company_id,
                    title: recommendation.title,
                    status: recommendation.status,
                    execution_status: recommendation.execution_status,
                    execution_output: recommendation.execution_output,
                    execution_error: recommendation.execution_error,
                    created_at: now.clone(),
                    updated_at: now,
                };
                let result_db = diesel::insert_into(recommendations::table)
                    .values(&row)
                    .returning(RecommendationDB::as_returning())
                    .get_result::<RecommendationDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }
}

#[async_trait]
impl RecommendationRepositoryTrait for RecommendationRepository {
    async fn get_by_id(&self, recommendation_id: &str) -> Result<Recommendation> {
        let mut conn = get_connection(&self.pool)?;
        let row = recommendations::table
            .find(recommendation_id)
            .first::<RecommendationDB>(&mut conn)
            .into_core()?;
        row.into_domain()
    }

    async fn update_execution(
        &self,
        recommendation_id: &str,
        update: ExecutionUpdate,
    ) -> Result<Recommendation> {
        let recommendation_id = recommendation_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Recommendation> {
                let affected =
                    diesel::update(recommendations::table.find(&recommendation_id))
                        .set((
                            recommendations::execution_status.eq(&update.status),
                            recommendations::execution_output.eq(&update.output),
                            recommendations::execution_error.eq(&update.error),
                            recommendations::updated_at.eq(Utc::now().to_rfc3339()),
                        ))
                        .execute(conn)
                        .into_core()?;
                if affected == 0 {
                    return Err(
                        StorageError::QueryFailed(diesel::result::Error::NotFound).into()
                    );
                }
                let result_db = recommendations::table
                    .find(&recommendation_id)
                    .first::<RecommendationDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }
}
