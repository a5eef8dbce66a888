use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use adpulse_core::connections::{
    AdConnection, AdConnectionRepositoryTrait, NewAdConnection, SyncStatus, TokenUpdate,
};
use adpulse_core::Result;
use adpulse_platforms::AdPlatform;

use super::model::AdConnectionDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::ad_connections;

pub struct AdConnectionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl AdConnectionRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        AdConnectionRepository { pool, writer }
    }
}

#[async_trait]
impl AdConnectionRepositoryTrait for AdConnectionRepository {
    async fn get_by_id(&self, connection_id: &str) -> Result<AdConnection> {
        let mut conn = get_connection(&self.pool)?;
        let row = ad_connections::table
            .find(connection_id)
            .first::<AdConnectionDB>(&mut conn)
            .into_core()?;
        row.into_domain()
    }

    async fn list_for_company(
        &self,
        company_id: &str,
        platform: Option<AdPlatform>,
    ) -> Result<Vec<AdConnection>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = ad_connections::table
            .filter(ad_connections::company_id.eq(company_id))
            .into_boxed();
        if let Some(platform) = platform {
            query = query.filter(ad_connections::platform.eq(platform.as_str()));
        }
        let rows = query
            .order(ad_connections::created_at.asc())
            .load::<AdConnectionDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(AdConnectionDB::into_domain).collect()
    }

    async fn list_company_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = ad_connections::table
            .select(ad_connections::company_id)
            .distinct()
            .order(ad_connections::company_id.asc())
            .load::<String>(&mut conn)
            .into_core()?;
        Ok(ids)
    }

    async fn create(&self, new_connection: NewAdConnection) -> Result<AdConnection> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AdConnection> {
                let connection_db: AdConnectionDB = new_connection.into();
                let result_db = diesel::insert_into(ad_connections::table)
                    .values(&connection_db)
                    .on_conflict((
                        ad_connections::company_id,
                        ad_connections::platform,
                        ad_connections::external_account_id,
                    ))
                    .do_update()
                    .set((
                        ad_connections::account_name.eq(&connection_db.account_name),
                        ad_connections::access_token.eq(&connection_db.access_token),
                        ad_connections::refresh_token.eq(&connection_db.refresh_token),
                        ad_connections::token_expires_at.eq(&connection_db.token_expires_at),
                        ad_connections::updated_at.eq(&connection_db.updated_at),
                    ))
                    .returning(AdConnectionDB::as_returning())
                    .get_result::<AdConnectionDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }

    async fn update_tokens(
        &self,
        connection_id: &str,
        tokens: TokenUpdate,
    ) -> Result<AdConnection> {
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AdConnection> {
                diesel::update(ad_connections::table.find(&connection_id))
                    .set((
                        ad_connections::access_token.eq(&tokens.access_token),
                        ad_connections::refresh_token.eq(&tokens.refresh_token),
                        ad_connections::token_expires_at
                            .eq(tokens.token_expires_at.map(|dt| dt.to_rfc3339())),
                        ad_connections::updated_at.eq(Utc::now().to_rfc3339()),
                    ))
                    .execute(conn)
                    .into_core()?;
                let result_db = ad_connections::table
                    .find(&connection_id)
                    .first::<AdConnectionDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }

    async fn set_status(
        &self,
        connection_id: &str,
        status: SyncStatus,
        error: Option<String>,
    ) -> Result<AdConnection> {
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<AdConnection> {
                let now = Utc::now().to_rfc3339();
                let affected = match status {
                    SyncStatus::Syncing => diesel::update(ad_connections::table.find(&connection_id))
                        .set((
                            ad_connections::sync_status.eq(status.as_str()),
                            ad_connections::last_sync_at.eq(Some(now.clone())),
                            ad_connections::updated_at.eq(&now),
                        ))
                        .execute(conn),
                    SyncStatus::Healthy => diesel::update(ad_connections::table.find(&connection_id))
                        .set((
                            ad_connections::sync_status.eq(status.as_str()),
                            ad_connections::sync_error.eq(None::<String>),
                            ad_connections::updated_at.eq(&now),
                        ))
                        .execute(conn),
                    SyncStatus::Error => diesel::update(ad_connections::table.find(&connection_id))
                        .set((
                            ad_connections::sync_status.eq(status.as_str()),
                            ad_connections::sync_error.eq(&error),
                            ad_connections::updated_at.eq(&now),
                        ))
                        .execute(conn),
                    SyncStatus::Idle => diesel::update(ad_connections::table.find(&connection_id))
                        .set((
                            ad_connections::sync_status.eq(status.as_str()),
                            ad_connections::updated_at.eq(&now),
                        ))
                        .execute(conn),
                }
                .into_core()?;
                if affected == 0 {
                    return Err(StorageError::QueryFailed(diesel::result::Error::NotFound).into());
                }
                let result_db = ad_connections::table
                    .find(&connection_id)
                    .first::<AdConnectionDB>(conn)
                    .into_core()?;
                result_db.into_domain()
            })
            .await
    }

    async fn delete(&self, connection_id: &str) -> Result<()> {
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(ad_connections::table.find(connection_id))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
