//! HTTP route tests against a full in-process app with a temp database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use adpulse_core::auth_flow::{AuthFlowState, StateTokenCodec};
use adpulse_core::connections::AdConnectionRepositoryTrait;
use adpulse_core::recommendations::{Recommendation, RecommendationRepositoryTrait};
use adpulse_platforms::AdPlatform;
use adpulse_server::api::app_router;
use adpulse_server::auth::{issue_token, Claims};
use adpulse_server::config::Config;
use adpulse_server::{build_state, AppState};
use adpulse_storage_sqlite::db;
use adpulse_storage_sqlite::recommendations::RecommendationRepository;

const AUTH_SECRET: &str = "test-secret";
const CRON_SECRET: &str = "cron-secret";
const WEBHOOK_SECRET: &str = "hook-secret";

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            listen_addr: "127.0.0.1:0".to_string(),
            db_path: dir
                .path()
                .join("adpulse.db")
                .to_string_lossy()
                .into_owned(),
            app_url: "http://app.test".to_string(),
            auth_secret: AUTH_SECRET.to_string(),
            cron_secret: Some(CRON_SECRET.to_string()),
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            sync_interval_secs: 3600,
            sync_concurrency: 2,
            sync_days_back: 30,
        };
        let state = build_state(&config).await.unwrap();
        TestApp {
            router: app_router(state.clone()),
            state,
            dir,
        }
    }

    async fn request(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn bearer(&self, company_id: &str, role: &str) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            company_id: company_id.to_string(),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
        };
        format!("Bearer {}", issue_token(AUTH_SECRET, &claims).unwrap())
    }

    /// Second repository handle on the same database file, for seeding.
    fn recommendation_repository(&self) -> RecommendationRepository {
        let path = self.dir.path().join("adpulse.db");
        let (pool, writer) = db::init(&path.to_string_lossy()).unwrap();
        RecommendationRepository::new(pool, writer)
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

#[tokio::test]
async fn test_health_ok() {
    let app = TestApp::new().await;
    let response = app
        .request(Request::get("/api/v1/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_authorize_requires_auth() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/integrations/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authorize_without_registered_app_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/integrations/google")
                .header(header::AUTHORIZATION, app.bearer("co-1", "member"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_missing_params_redirects() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/integrations/callback/google")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://app.test/dashboard/integrations?error=missing_params"
    );
}

#[tokio::test]
async fn test_callback_unknown_platform_redirects() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/integrations/callback/yahoo?code=abc&state=xyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert!(location(&response).ends_with("error=missing_params"));
}

#[tokio::test]
async fn test_callback_tampered_state_creates_nothing() {
    let app = TestApp::new().await;

    // Token signed with a different secret than the server's.
    let foreign = StateTokenCodec::new(b"not-the-server-secret");
    let token = foreign
        .encode(&AuthFlowState::new("co-1", "user-1", AdPlatform::Google))
        .unwrap();

    let response = app
        .request(
            Request::get(format!(
                "/api/v1/integrations/callback/google?code=abc&state={}",
                token
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://app.test/dashboard/integrations?error=invalid_state"
    );

    let connections = app
        .state
        .connection_repository
        .list_for_company("co-1", None)
        .await
        .unwrap();
    assert!(connections.is_empty());
}

#[tokio::test]
async fn test_manual_sync_requires_auth() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::post("/api/v1/sync/manual")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_manual_sync_with_no_connections() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::post("/api/v1/sync/manual")
                .header(header::AUTHORIZATION, app.bearer("co-1", "member"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_manual_sync_unknown_connection_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::post("/api/v1/sync/manual")
                .header(header::AUTHORIZATION, app.bearer("co-1", "member"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"connectionId":"missing"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cron_rejected_without_secret_or_admin() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A non-admin bearer token is not enough either.
    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics")
                .header(header::AUTHORIZATION, app.bearer("co-1", "member"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cron_with_secret_sweeps_all() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics?scope=all")
                .header("x-cron-secret", CRON_SECRET)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_cron_company_scope_needs_authed_admin() {
    let app = TestApp::new().await;

    // Secret alone cannot resolve a company.
    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics?scope=company")
                .header("x-cron-secret", CRON_SECRET)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics?scope=company")
                .header(header::AUTHORIZATION, app.bearer("co-1", "admin"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cron_unknown_scope_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::get("/api/v1/cron/sync-metrics?scope=everything")
                .header("x-cron-secret", CRON_SECRET)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_rejects_bad_secret() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::post("/api/v1/webhooks/n8n")
                .header("x-webhook-secret", "wrong")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"recommendationId":"r-1","status":"success"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_unknown_recommendation_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Request::post("/api/v1/webhooks/n8n")
                .header("x-webhook-secret", WEBHOOK_SECRET)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"recommendationId":"missing","status":"success"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_webhook_records_execution_outcome() {
    let app = TestApp::new().await;
    let repository = app.recommendation_repository();
    repository
        .insert(Recommendation {
            id: "rec-1".to_string(),
            company_id: "co-1".to_string(),
            title: "Pause underperforming campaign".to_string(),
            status: "approved".to_string(),
            execution_status: None,
            execution_output: None,
            execution_error: None,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();

    let response = app
        .request(
            Request::post("/api/v1/webhooks/n8n")
                .header("x-webhook-secret", WEBHOOK_SECRET)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"recommendationId":"rec-1","status":"success","output":"campaign paused"}"#,
                ))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "rec-1");
    assert_eq!(body["executionStatus"], "success");

    let stored = repository.get_by_id("rec-1").await.unwrap();
    assert_eq!(stored.execution_status.as_deref(), Some("success"));
    assert_eq!(stored.execution_output.as_deref(), Some("campaign paused"));
}
