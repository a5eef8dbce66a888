use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;

use adpulse_core::campaigns::{
    CampaignRepositoryTrait, MetricsQuery, StoredCampaign, StoredCreative, StoredMetricsRecord,
};
use adpulse_core::Result;
use adpulse_platforms::{AdPlatform, Campaign, Creative, MetricsRecord};

use super::model::{CampaignDB, CreativeDB, MetricsRecordDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{campaigns, creatives, metrics_records};

pub struct CampaignRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CampaignRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CampaignRepository { pool, writer }
    }
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    async fn upsert_campaigns(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        campaigns_in: Vec<Campaign>,
    ) -> Result<usize> {
        let company_id = company_id.to_string();
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected = 0;
                for campaign in campaigns_in {
                    let campaign_db = CampaignDB::from_normalized(
                        &company_id,
                        &connection_id,
                        platform,
                        campaign,
                    );
                    affected += diesel::insert_into(campaigns::table)
                        .values(&campaign_db)
                        .on_conflict((
                            campaigns::company_id,
                            campaigns::platform,
                            campaigns::external_id,
                        ))
                        .do_update()
                        .set((
                            campaigns::connection_id.eq(&campaign_db.connection_id),
                            campaigns::name.eq(&campaign_db.name),
                            campaigns::status.eq(&campaign_db.status),
                            campaigns::budget_daily.eq(&campaign_db.budget_daily),
                            campaigns::updated_at.eq(Utc::now().to_rfc3339()),
                        ))
                        .execute(conn)
                        .into_core()?;
                }
                Ok(affected)
            })
            .await
    }

    async fn upsert_metrics(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        records: Vec<MetricsRecord>,
    ) -> Result<usize> {
        let company_id = company_id.to_string();
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected = 0;
                for record in records {
                    let record_db = MetricsRecordDB::from_normalized(
                        &company_id,
                        &connection_id,
                        platform,
                        record,
                    );
                    affected += diesel::insert_into(metrics_records::table)
                        .values(&record_db)
                        .on_conflict((
                            metrics_records::company_id,
                            metrics_records::platform,
                            metrics_records::campaign_external_id,
                            metrics_records::date,
                        ))
                        .do_update()
                        .set((
                            metrics_records::connection_id.eq(&record_db.connection_id),
                            metrics_records::impressions.eq(record_db.impressions),
                            metrics_records::clicks.eq(record_db.clicks),
                            metrics_records::spend.eq(&record_db.spend),
                            metrics_records::revenue.eq(&record_db.revenue),
                            metrics_records::updated_at.eq(Utc::now().to_rfc3339()),
                        ))
                        .execute(conn)
                        .into_core()?;
                }
                Ok(affected)
            })
            .await
    }

    async fn upsert_creatives(
        &self,
        company_id: &str,
        connection_id: &str,
        platform: AdPlatform,
        creatives_in: Vec<Creative>,
    ) -> Result<usize> {
        let company_id = company_id.to_string();
        let connection_id = connection_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut affected = 0;
                for creative in creatives_in {
                    let creative_db = CreativeDB::from_normalized(
                        &company_id,
                        &connection_id,
                        platform,
                        creative,
                    );
                    affected += diesel::insert_into(creatives::table)
                        .values(&creative_db)
                        .on_conflict((
                            creatives::company_id,
                            creatives::platform,
                            creatives::external_id,
                        ))
                        .do_update()
                        .set((
                            creatives::connection_id.eq(&creative_db.connection_id),
                            creatives::campaign_external_id.eq(&creative_db.campaign_external_id),
                            creatives::name.eq(&creative_db.name),
                            creatives::status.eq(&creative_db.status),
                            creatives::updated_at.eq(Utc::now().to_rfc3339()),
                        ))
                        .execute(conn)
                        .into_core()?;
                }
                Ok(affected)
            })
            .await
    }

    async fn list_campaigns(&self, company_id: &str) -> Result<Vec<StoredCampaign>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = campaigns::table
            .filter(campaigns::company_id.eq(company_id))
            .order((campaigns::platform.asc(), campaigns::external_id.asc()))
            .load::<CampaignDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(CampaignDB::into_domain).collect()
    }

    async fn list_metrics(
        &self,
        company_id: &str,
        query: MetricsQuery,
    ) -> Result<Vec<StoredMetricsRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let mut db_query = metrics_records::table
            .filter(metrics_records::company_id.eq(company_id))
            .into_boxed();
        if let Some(campaign_external_id) = query.campaign_external_id {
            db_query =
                db_query.filter(metrics_records::campaign_external_id.eq(campaign_external_id));
        }
        if let Some(start) = query.start {
            db_query =
                db_query.filter(metrics_records::date.ge(start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = query.end {
            db_query =
                db_query.filter(metrics_records::date.le(end.format("%Y-%m-%d").to_string()));
        }
        let rows = db_query
            .order(metrics_records::date.asc())
            .load::<MetricsRecordDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(MetricsRecordDB::into_domain).collect()
    }

    async fn list_creatives(&self, company_id: &str) -> Result<Vec<StoredCreative>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = creatives::table
            .filter(creatives::company_id.eq(company_id))
            .order(creatives::external_id.asc())
            .load::<CreativeDB>(&mut conn)
            .into_core()?;
        rows.into_iter().map(CreativeDB::into_domain).collect()
    }
}
