//! Database models for company OAuth apps.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use adpulse_core::credentials::{CompanyOAuthApp, NewCompanyOAuthApp};
use adpulse_core::Result;

use crate::utils::{parse_enum, parse_timestamp};

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
#[diesel(table_name = crate::schema::company_oauth_apps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct CompanyOAuthAppDB {
    pub id: String,
    pub company_id: String,
    pub platform: String,
    pub client_id: String,
    pub client_secret: String,
    pub developer_token: Option<String>,
    pub redirect_uri: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl CompanyOAuthAppDB {
    pub fn into_domain(self) -> Result<CompanyOAuthApp> {
        Ok(CompanyOAuthApp {
            platform: parse_enum("platform", &self.platform)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            company_id: self.company_id,
            client_id: self.client_id,
            client_secret: self.client_secret,
            developer_token: self.developer_token,
            redirect_uri: self.redirect_uri,
            is_active: self.is_active,
        })
    }
}

impl From<NewCompanyOAuthApp> for CompanyOAuthAppDB {
    fn from(domain: NewCompanyOAuthApp) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: domain.company_id,
            platform: domain.platform.to_string(),
            client_id: domain.client_id,
            client_secret: domain.client_secret,
            developer_token: domain.developer_token,
            redirect_uri: domain.redirect_uri,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
