use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use adpulse_core::credentials::{
    CompanyOAuthApp, CompanyOAuthAppRepositoryTrait, NewCompanyOAuthApp,
};
use adpulse_core::Result;
use adpulse_platforms::AdPlatform;

use super::model::CompanyOAuthAppDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::company_oauth_apps;

pub struct CompanyOAuthAppRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CompanyOAuthAppRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CompanyOAuthAppRepository { pool, writer }
    }
}

#[async_trait]
impl CompanyOAuthAppRepositoryTrait for CompanyOAuthAppRepository {
    async fn get_for_platform(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<Option<CompanyOAuthApp>> {
        let mut conn = get_connection(&self.pool)?;
        let row = company_oauth_apps::table
            .filter(company_oauth_apps::company_id.eq(company_id))
            .filter(company_oauth_apps::platform.eq(platform.as_str()))
            .filter(company_oauth_apps::is_active.eq(true))
            .first::<CompanyOAuthAppDB>(&mut conn)
            .optional()
            .into_core()?;
        row.map(CompanyOAuthAppDB::into_domain).transpose()
    }

    async fn upsert(&self, new_app: NewCompanyOAuthApp) -> Result<CompanyOAuthApp> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CompanyOAuthApp> {
                let app_db: CompanyOAuthAppDB = new_app.into();
                let result_db = diesel::insert_into(company_oauth_apps::table)
                    .values(&app_db)
                    .on_conflict((
                        company_oauth_apps::company_id,
                        company_oauth_apps::platform,
                    ))
                    .do_update()
                    .set((
                        company_oauth_apps::client_id.eq(&app_db.client_id),
                        company_oauth_apps::client_secret.eq(&app_db.client_secret),
                        company_oauth_apps::developer_token.eq(&app_db.developer_token),
                        company_oauth_apps::redirect_uri.eq(&app_db.redirect_uri),
                        company_oauth_apps::is_active.eq(true),
                        company_oauth_apps::updated_at.eq(&app_db.updated_at),
                    ))
                    .returning(CompanyOAuthAppDB::as_returning())
                    .get_result::<CompanyOAuthAppDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }

    async fn list_for_company(&self, company_id: &str) -> Result<Vec<CompanyOAuthApp>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = company_oauth_apps::table
            .filter(company_oauth_apps::company_id.eq(company_id))
            .order(company_oauth_apps::platform.asc())
            .load::<CompanyOAuthAppDB>(&mut conn)
            .into_core()?;
        rows.into_iter()
            .map(CompanyOAuthAppDB::into_domain)
            .collect()
    }

    async fn delete(&self, company_id: &str, platform: AdPlatform) -> Result<()> {
        let company_id = company_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(
                    company_oauth_apps::table
                        .filter(company_oauth_apps::company_id.eq(company_id))
                        .filter(company_oauth_apps::platform.eq(platform.as_str())),
                )
                .execute(conn)
                .into_core()?;
                Ok(())
            })
            .await
    }
}
