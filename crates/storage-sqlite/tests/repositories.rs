//! Repository integration tests against a real SQLite file.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use adpulse_core::campaigns::{CampaignRepositoryTrait, MetricsQuery};
use adpulse_core::connections::{
    AdConnectionRepositoryTrait, NewAdConnection, SyncStatus, TokenUpdate,
};
use adpulse_core::credentials::{CompanyOAuthAppRepositoryTrait, NewCompanyOAuthApp};
use adpulse_core::errors::{DatabaseError, Error};
use adpulse_core::recommendations::{
    ExecutionUpdate, Recommendation, RecommendationRepositoryTrait,
};
use adpulse_platforms::{AdPlatform, Campaign, CampaignStatus, Creative, MetricsRecord};
use adpulse_storage_sqlite::campaigns::CampaignRepository;
use adpulse_storage_sqlite::connections::AdConnectionRepository;
use adpulse_storage_sqlite::credentials::CompanyOAuthAppRepository;
use adpulse_storage_sqlite::db;
use adpulse_storage_sqlite::recommendations::RecommendationRepository;

struct TestDb {
    _dir: TempDir,
    pool: db::DbPool,
    writer: db::WriteHandle,
}

fn test_db() -> TestDb {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("adpulse-test.db");
    let (pool, writer) = db::init(path.to_str().unwrap()).unwrap();
    TestDb {
        _dir: dir,
        pool,
        writer,
    }
}

fn new_connection(company: &str, platform: AdPlatform, account: &str) -> NewAdConnection {
    NewAdConnection {
        company_id: company.to_string(),
        platform,
        external_account_id: account.to_string(),
        account_name: "Test account".to_string(),
        access_token: "access-1".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        token_expires_at: Some(Utc::now() + Duration::hours(1)),
    }
}

fn campaign(external_id: &str, name: &str) -> Campaign {
    Campaign {
        external_id: external_id.to_string(),
        name: name.to_string(),
        status: CampaignStatus::Active,
        budget_daily: dec!(25.00),
    }
}

fn metric(campaign_id: &str, date: NaiveDate, clicks: i64) -> MetricsRecord {
    MetricsRecord {
        campaign_external_id: campaign_id.to_string(),
        date,
        impressions: 1000,
        clicks,
        spend: dec!(10.50),
        revenue: dec!(21.00),
    }
}

#[tokio::test]
async fn test_campaign_upsert_is_idempotent() {
    let db = test_db();
    let repo = CampaignRepository::new(db.pool.clone(), db.writer.clone());

    repo.upsert_campaigns(
        "company-1",
        "conn-1",
        AdPlatform::Google,
        vec![campaign("cmp-1", "First name")],
    )
    .await
    .unwrap();
    repo.upsert_campaigns(
        "company-1",
        "conn-1",
        AdPlatform::Google,
        vec![campaign("cmp-1", "Renamed")],
    )
    .await
    .unwrap();

    let stored = repo.list_campaigns("company-1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Renamed");
    assert_eq!(stored[0].budget_daily, dec!(25.00));
}

#[tokio::test]
async fn test_same_campaign_id_on_two_platforms_stays_separate() {
    let db = test_db();
    let repo = CampaignRepository::new(db.pool.clone(), db.writer.clone());

    repo.upsert_campaigns(
        "company-1",
        "conn-1",
        AdPlatform::Google,
        vec![campaign("42", "Google campaign")],
    )
    .await
    .unwrap();
    repo.upsert_campaigns(
        "company-1",
        "conn-2",
        AdPlatform::Meta,
        vec![campaign("42", "Meta campaign")],
    )
    .await
    .unwrap();

    let stored = repo.list_campaigns("company-1").await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_metrics_resync_overwrites_same_day() {
    let db = test_db();
    let repo = CampaignRepository::new(db.pool.clone(), db.writer.clone());
    let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    repo.upsert_metrics(
        "company-1",
        "conn-1",
        AdPlatform::TikTok,
        vec![metric("cmp-1", day, 10)],
    )
    .await
    .unwrap();
    repo.upsert_metrics(
        "company-1",
        "conn-1",
        AdPlatform::TikTok,
        vec![metric("cmp-1", day, 55)],
    )
    .await
    .unwrap();

    let stored = repo
        .list_metrics("company-1", MetricsQuery::default())
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].clicks, 55);
    assert_eq!(stored[0].spend, dec!(10.50));
    assert_eq!(stored[0].revenue, dec!(21.00));
}

#[tokio::test]
async fn test_metrics_date_filter() {
    let db = test_db();
    let repo = CampaignRepository::new(db.pool.clone(), db.writer.clone());
    let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let d3 = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

    repo.upsert_metrics(
        "company-1",
        "conn-1",
        AdPlatform::Google,
        vec![metric("cmp-1", d1, 1), metric("cmp-1", d2, 2), metric("cmp-1", d3, 3)],
    )
    .await
    .unwrap();

    let stored = repo
        .list_metrics(
            "company-1",
            MetricsQuery {
                campaign_external_id: None,
                start: Some(d2),
                end: Some(d3),
            },
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].date, d2);
    assert_eq!(stored[1].date, d3);
}

#[tokio::test]
async fn test_creative_upsert_round_trips_status() {
    let db = test_db();
    let repo = CampaignRepository::new(db.pool.clone(), db.writer.clone());
    let creative = |name: &str| Creative {
        external_id: "cr-1".to_string(),
        campaign_external_id: Some("cmp-1".to_string()),
        name: name.to_string(),
        status: CampaignStatus::Paused,
    };

    repo.upsert_creatives(
        "company-1",
        "conn-1",
        AdPlatform::Meta,
        vec![creative("First cut")],
    )
    .await
    .unwrap();
    repo.upsert_creatives(
        "company-1",
        "conn-1",
        AdPlatform::Meta,
        vec![creative("Final cut")],
    )
    .await
    .unwrap();

    let stored = repo.list_creatives("company-1").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Final cut");
    assert_eq!(stored[0].status, "paused");
    assert_eq!(stored[0].campaign_external_id.as_deref(), Some("cmp-1"));
}

#[tokio::test]
async fn test_reconnecting_same_account_refreshes_tokens() {
    let db = test_db();
    let repo = AdConnectionRepository::new(db.pool.clone(), db.writer.clone());

    let first = repo
        .create(new_connection("company-1", AdPlatform::LinkedIn, "acct-1"))
        .await
        .unwrap();

    let mut again = new_connection("company-1", AdPlatform::LinkedIn, "acct-1");
    again.access_token = "access-2".to_string();
    let second = repo.create(again).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.access_token, "access-2");
    assert_eq!(
        repo.list_for_company("company-1", None).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_status_transitions_shape_the_row() {
    let db = test_db();
    let repo = AdConnectionRepository::new(db.pool.clone(), db.writer.clone());
    let conn = repo
        .create(new_connection("company-1", AdPlatform::Google, "acct-1"))
        .await
        .unwrap();
    assert_eq!(conn.sync_status, SyncStatus::Idle);
    assert!(conn.last_sync_at.is_none());

    let syncing = repo
        .set_status(&conn.id, SyncStatus::Syncing, None)
        .await
        .unwrap();
    assert_eq!(syncing.sync_status, SyncStatus::Syncing);
    assert!(syncing.last_sync_at.is_some());

    let failed = repo
        .set_status(&conn.id, SyncStatus::Error, Some("rate limited".to_string()))
        .await
        .unwrap();
    assert_eq!(failed.sync_status, SyncStatus::Error);
    assert_eq!(failed.sync_error.as_deref(), Some("rate limited"));

    let healthy = repo
        .set_status(&conn.id, SyncStatus::Healthy, None)
        .await
        .unwrap();
    assert_eq!(healthy.sync_status, SyncStatus::Healthy);
    assert!(healthy.sync_error.is_none());
    assert!(healthy.last_sync_at.is_some());
}

#[tokio::test]
async fn test_set_status_on_unknown_connection_is_not_found() {
    let db = test_db();
    let repo = AdConnectionRepository::new(db.pool.clone(), db.writer.clone());

    let missing = repo
        .set_status("conn-unknown", SyncStatus::Healthy, None)
        .await;
    assert!(matches!(
        missing,
        Err(Error::Database(DatabaseError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_update_tokens_persists_new_material() {
    let db = test_db();
    let repo = AdConnectionRepository::new(db.pool.clone(), db.writer.clone());
    let conn = repo
        .create(new_connection("company-1", AdPlatform::Google, "acct-1"))
        .await
        .unwrap();

    let expires = Utc::now() + Duration::hours(2);
    let updated = repo
        .update_tokens(
            &conn.id,
            TokenUpdate {
                access_token: "fresh".to_string(),
                refresh_token: Some("refresh-2".to_string()),
                token_expires_at: Some(expires),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.access_token, "fresh");
    assert_eq!(updated.refresh_token.as_deref(), Some("refresh-2"));
    assert!(updated.token_expires_at.is_some());
}

#[tokio::test]
async fn test_company_ids_are_distinct() {
    let db = test_db();
    let repo = AdConnectionRepository::new(db.pool.clone(), db.writer.clone());
    repo.create(new_connection("company-a", AdPlatform::Google, "acct-1"))
        .await
        .unwrap();
    repo.create(new_connection("company-a", AdPlatform::Meta, "acct-2"))
        .await
        .unwrap();
    repo.create(new_connection("company-b", AdPlatform::Google, "acct-3"))
        .await
        .unwrap();

    let ids = repo.list_company_ids().await.unwrap();
    assert_eq!(ids, vec!["company-a".to_string(), "company-b".to_string()]);
}

#[tokio::test]
async fn test_oauth_app_upsert_replaces_per_platform() {
    let db = test_db();
    let repo = CompanyOAuthAppRepository::new(db.pool.clone(), db.writer.clone());

    repo.upsert(NewCompanyOAuthApp {
        company_id: "company-1".to_string(),
        platform: AdPlatform::Meta,
        client_id: "old-client".to_string(),
        client_secret: "old-secret".to_string(),
        developer_token: None,
        redirect_uri: "https://app.example.com/cb".to_string(),
    })
    .await
    .unwrap();
    repo.upsert(NewCompanyOAuthApp {
        company_id: "company-1".to_string(),
        platform: AdPlatform::Meta,
        client_id: "new-client".to_string(),
        client_secret: "new-secret".to_string(),
        developer_token: None,
        redirect_uri: "https://app.example.com/cb".to_string(),
    })
    .await
    .unwrap();

    let apps = repo.list_for_company("company-1").await.unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].client_id, "new-client");

    let active = repo
        .get_for_platform("company-1", AdPlatform::Meta)
        .await
        .unwrap();
    assert!(active.is_some());
    assert!(repo
        .get_for_platform("company-1", AdPlatform::Google)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_recommendation_execution_update() {
    let db = test_db();
    let repo = RecommendationRepository::new(db.pool.clone(), db.writer.clone());

    repo.insert(Recommendation {
        id: "rec-1".to_string(),
        company_id: "company-1".to_string(),
        title: "Raise budget on cmp-1".to_string(),
        status: "approved".to_string(),
        execution_status: None,
        execution_output: None,
        execution_error: None,
        updated_at: Utc::now(),
    })
    .await
    .unwrap();

    let updated = repo
        .update_execution(
            "rec-1",
            ExecutionUpdate {
                status: "completed".to_string(),
                output: Some("budget set to 60".to_string()),
                error: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.execution_status.as_deref(), Some("completed"));

    let missing = repo
        .update_execution(
            "rec-unknown",
            ExecutionUpdate {
                status: "completed".to_string(),
                output: None,
                error: None,
            },
        )
        .await;
    assert!(matches!(
        missing,
        Err(Error::Database(DatabaseError::NotFound(_)))
    ));
}
