//! Database models for ad-platform connections.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adpulse_core::connections::{AdConnection, NewAdConnection, SyncStatus};
use adpulse_core::Result;

use crate::utils::{parse_enum, parse_timestamp, parse_timestamp_opt};

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
#[diesel(table_name = crate::schema::ad_connections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct AdConnectionDB {
    pub id: String,
    pub company_id: String,
    pub platform: String,
    pub external_account_id: String,
    pub account_name: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<String>,
    pub sync_status: String,
    pub last_sync_at: Option<String>,
    pub sync_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl AdConnectionDB {
    pub fn into_domain(self) -> Result<AdConnection> {
        Ok(AdConnection {
            platform: parse_enum("platform", &self.platform)?,
            sync_status: parse_enum("sync_status", &self.sync_status)?,
            token_expires_at: parse_timestamp_opt(
                "token_expires_at",
                self.token_expires_at.as_deref(),
            )?,
            last_sync_at: parse_timestamp_opt("last_sync_at", self.last_sync_at.as_deref())?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            external_account_id: self.external_account_id,
            account_name: self.account_name,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            sync_error: self.sync_error,
        })
    }
}

impl From<NewAdConnection> for AdConnectionDB {
    fn from(domain: NewAdConnection) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: domain.company_id,
            platform: domain.platform.to_string(),
            external_account_id: domain.external_account_id,
            account_name: domain.account_name,
            access_token: domain.access_token,
            refresh_token: domain.refresh_token,
            token_expires_at: domain.token_expires_at.map(|dt| dt.to_rfc3339()),
            sync_status: SyncStatus::Idle.as_str().to_string(),
            last_sync_at: None,
            sync_error: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
