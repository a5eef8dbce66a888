//! Database models for recommendations.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use adpulse_core::recommendations::Recommendation;
use adpulse_core::Result;

use crate::utils::parse_timestamp;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::recommendations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDB {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub status: String,
    pub execution_status: Option<String>,
    pub execution_output: Option<String>,
    pub execution_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl RecommendationDB {
    pub fn into_domain(self) -> Result<Recommendation> {
        Ok(Recommendation {
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            title: self.title,
            status: self.status,
            execution_status: self.execution_status,
            execution_output: self.execution_output,
            execution_error: self.execution_error,
        })
    }
}
