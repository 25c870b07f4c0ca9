use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use genesis_advisor::RoleAdvisor;
use genesis_core::showcase::ShowcaseProvider;
use genesis_storage::Database;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::assign::CommunityAssigner;
use crate::{assign, recommend, showcase, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    assigner: CommunityAssigner<Database>,
    advisor: Option<RoleAdvisor>,
    showcase: Arc<dyn ShowcaseProvider>,
}

impl AppState {
    pub fn new(
        metrics: PrometheusHandle,
        storage: Database,
        advisor: Option<RoleAdvisor>,
        showcase: Arc<dyn ShowcaseProvider>,
    ) -> Self {
        let clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync> = Arc::new(Utc::now);
        let assigner = CommunityAssigner::new(storage, clock.clone());
        Self {
            metrics,
            clock,
            assigner,
            advisor,
            showcase,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>) -> Self {
        self.clock = clock.clone();
        self.assigner = self.assigner.with_clock(clock);
        self
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn assigner(&self) -> &CommunityAssigner<Database> {
        &self.assigner
    }

    pub fn advisor(&self) -> Option<&RoleAdvisor> {
        self.advisor.as_ref()
    }

    pub fn showcase(&self) -> &dyn ShowcaseProvider {
        self.showcase.as_ref()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route("/api/communities/assign", post(assign::handle))
        .route("/api/communities/feed", get(showcase::feed))
        .route("/api/ai/recommendations", post(recommend::handle))
        .route("/api/leaderboard", get(showcase::leaderboard))
        .route(
            "/api/users/profile",
            get(showcase::profile).put(showcase::update_profile),
        )
        .route("/api/domains", get(showcase::domains))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};
    use chrono::TimeZone;
    use genesis_advisor::ChatClient;
    use genesis_core::showcase::StaticShowcase;
    use http_body_util::BodyExt;
    use httpmock::prelude::*;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use url::Url;

    async fn setup_database() -> Database {
        let database = Database::connect("sqlite::memory:?cache=shared")
            .await
            .expect("connect");
        database.run_migrations().await.expect("migrations");
        database
    }

    async fn setup_state_with(database: Database, advisor: Option<RoleAdvisor>) -> AppState {
        let metrics = telemetry::init_metrics().expect("metrics init");
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        AppState::new(metrics, database, advisor, Arc::new(StaticShowcase))
            .with_clock(Arc::new(move || now))
    }

    async fn setup_state() -> AppState {
        setup_state_with(setup_database().await, None).await
    }

    fn advisor_for(server: &MockServer) -> RoleAdvisor {
        let base = Url::parse(&server.url("/v1/")).expect("url");
        RoleAdvisor::new(ChatClient::new("sk-test", base, reqwest::Client::new()), "gpt-4")
    }

    async fn send(state: AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send_raw(state, method, uri, body.map(|body| body.to_string())).await
    }

    async fn send_raw(
        state: AppState,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app_router(state)
            .oneshot(request)
            .await
            .expect("handler should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should read")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (status, _) = send(setup_state().await, Method::GET, "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exports_build_info() {
        let app = app_router(setup_state().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("handler should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let body = String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8");
        assert!(body.contains("app_build_info"));
        assert!(body.contains("app_uptime_seconds"));
    }

    #[tokio::test]
    async fn assign_reports_assigned_count() {
        let database = setup_database().await;
        let state = setup_state_with(database.clone(), None).await;

        let (status, body) = send(
            state,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "userId": "user-1", "domains": ["ai-ml", "cybersecurity"] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "assignedCommunities": 2 }));
        let community = database
            .communities()
            .find_by_slug("ai-ml")
            .await
            .expect("lookup")
            .expect("created");
        assert_eq!(community.name, "Ai Ml Community");
    }

    #[tokio::test]
    async fn assign_with_empty_domains_assigns_nothing() {
        let (status, body) = send(
            setup_state().await,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "userId": "user-1", "domains": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assignedCommunities"], 0);
    }

    #[tokio::test]
    async fn assign_rejects_missing_fields() {
        let (status, body) = send(
            setup_state().await,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "domains": ["law"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, _) = send(
            setup_state().await,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "userId": "", "domains": ["law"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assign_skips_domain_whose_creation_fails() {
        let database = setup_database().await;
        sqlx::query(
            "CREATE TRIGGER reject_law BEFORE INSERT ON communities \
             WHEN NEW.domain_slug = 'law' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END",
        )
        .execute(database.pool())
        .await
        .expect("create trigger");
        let state = setup_state_with(database.clone(), None).await;

        let (status, body) = send(
            state,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "userId": "user-1", "domains": ["law", "music", "film"] })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assignedCommunities"], 2);
        assert_eq!(database.communities().count_by_slug("law").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn assign_returns_generic_error_when_lookup_fails() {
        let database = setup_database().await;
        sqlx::query("DROP TABLE community_memberships")
            .execute(database.pool())
            .await
            .expect("drop memberships");
        sqlx::query("DROP TABLE communities")
            .execute(database.pool())
            .await
            .expect("drop communities");
        let state = setup_state_with(database, None).await;

        let (status, body) = send(
            state,
            Method::POST,
            "/api/communities/assign",
            Some(json!({ "userId": "user-1", "domains": ["law"] })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to assign communities" }));
    }

    #[tokio::test]
    async fn recommendations_require_domains() {
        let (status, body) = send(
            setup_state().await,
            Method::POST,
            "/api/ai/recommendations",
            Some(json!({ "domains": [] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No domains provided");
    }

    #[tokio::test]
    async fn recommendations_fall_back_on_unreadable_body() {
        let (status, body) = send_raw(
            setup_state().await,
            Method::POST,
            "/api/ai/recommendations",
            Some("{not json".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(5));

        let (status, body) = send(
            setup_state().await,
            Method::POST,
            "/api/ai/recommendations",
            Some(json!({ "domains": "ai-ml" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0], "AI Product Manager");
    }

    #[tokio::test]
    async fn recommendations_fall_back_without_provider() {
        let (status, body) = send(
            setup_state().await,
            Method::POST,
            "/api/ai/recommendations",
            Some(json!({ "domains": ["ai-ml"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0], "AI Product Manager");
        assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn recommendations_use_provider_reply() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({
                    "choices": [{
                        "message": { "role": "assistant", "content": "Legal Engineer, Policy Data Analyst" }
                    }]
                }));
            })
            .await;
        let state = setup_state_with(setup_database().await, Some(advisor_for(&server))).await;

        let (status, body) = send(
            state,
            Method::POST,
            "/api/ai/recommendations",
            Some(json!({ "domains": ["law", "politics"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "recommendations": ["Legal Engineer", "Policy Data Analyst"] })
        );
    }

    #[tokio::test]
    async fn recommendations_fall_back_when_provider_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(503).body("unavailable");
            })
            .await;
        let state = setup_state_with(setup_database().await, Some(advisor_for(&server))).await;

        let (status, body) = send(
            state,
            Method::POST,
            "/api/ai/recommendations",
            Some(json!({ "domains": ["law"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][4], "Solutions Architect");
    }

    #[tokio::test]
    async fn leaderboard_filters_by_domain() {
        let (status, body) = send(
            setup_state().await,
            Method::GET,
            "/api/leaderboard?domain=data&limit=10",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["leaderboard"][0]["user"]["username"], "lisa_wang");
    }

    #[tokio::test]
    async fn feed_paginates_posts() {
        let (status, body) = send(
            setup_state().await,
            Method::GET,
            "/api/communities/feed?page=1&limit=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["posts"][0]["created_at"], "2024-01-01T10:00:00Z");
        assert_eq!(
            body["pagination"],
            json!({
                "page": 1,
                "limit": 2,
                "total": 3,
                "totalPages": 2,
                "hasNext": true,
                "hasPrev": false
            })
        );
    }

    #[tokio::test]
    async fn malformed_query_returns_json_error() {
        for uri in ["/api/leaderboard?limit=-1", "/api/communities/feed?page=abc"] {
            let (status, body) = send(setup_state().await, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let message = body["error"].as_str().expect("json error body");
            assert!(message.starts_with("invalid query"), "{message}");
        }
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let (status, body) = send(setup_state().await, Method::GET, "/api/users/profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "john_doe");
        assert_eq!(body["badges"].as_array().map(Vec::len), Some(3));

        let (status, body) = send(
            setup_state().await,
            Method::PUT,
            "/api/users/profile",
            Some(json!({ "bio": "Learning Rust" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["user"]["bio"], "Learning Rust");
        assert_eq!(body["user"]["updated_at"], "2024-01-01T12:00:00.000Z");
    }

    #[tokio::test]
    async fn profile_update_rejects_non_object() {
        let (status, _) = send(
            setup_state().await,
            Method::PUT,
            "/api/users/profile",
            Some(json!(["bio"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn domains_lists_catalog() {
        let (status, body) = send(setup_state().await, Method::GET, "/api/domains", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "ai-ml");
        assert_eq!(body.as_array().map(Vec::len), Some(13));
    }
}
