use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recommendation produced by the external automation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub status: String,
    pub execution_status: Option<String>,
    pub execution_output: Option<String>,
    pub execution_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Execution outcome reported back by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionUpdate {
    pub status: String,
    pub output: Option<String>,
    pub error: Option<String>,
}
