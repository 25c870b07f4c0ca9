use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use genesis_core::catalog::{CareerDomain, CAREER_DOMAINS};
use genesis_core::showcase::{
    query_feed, query_leaderboard, FeedPage, FeedQuery, LeaderboardPage, LeaderboardQuery,
    UserProfile, DEFAULT_FEED_LIMIT, DEFAULT_FEED_PAGE, DEFAULT_LEADERBOARD_LIMIT,
};

use crate::error::ApiError;
use crate::router::AppState;

fn invalid_query(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(format!("invalid query: {}", rejection.body_text()))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    params: Result<Query<LeaderboardParams>, QueryRejection>,
) -> Result<Json<LeaderboardPage>, ApiError> {
    let Query(params) = params.map_err(invalid_query)?;
    let query = LeaderboardQuery {
        domain: params.domain,
        limit: params.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
    };
    Ok(Json(query_leaderboard(state.showcase().leaderboard(), &query)))
}

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    community: Option<String>,
}

pub async fn feed(
    State(state): State<AppState>,
    params: Result<Query<FeedParams>, QueryRejection>,
) -> Result<Json<FeedPage>, ApiError> {
    let Query(params) = params.map_err(invalid_query)?;
    let query = FeedQuery {
        page: params.page.unwrap_or(DEFAULT_FEED_PAGE),
        limit: params.limit.unwrap_or(DEFAULT_FEED_LIMIT),
        community: params.community.filter(|c| !c.is_empty()),
    };
    Ok(Json(query_feed(state.showcase().feed(state.now()), &query)))
}

pub async fn profile(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.showcase().profile())
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    success: bool,
    message: &'static str,
    user: Value,
}

/// Echoes the submitted fields back with an `updated_at` stamp; nothing is persisted.
pub async fn update_profile(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProfileUpdateResponse>, ApiError> {
    let Json(value) = payload.map_err(|rejection| {
        ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })?;
    let Value::Object(mut user) = value else {
        return Err(ApiError::bad_request("profile update must be a JSON object"));
    };

    user.insert(
        "updated_at".to_string(),
        Value::String(state.now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    Ok(Json(ProfileUpdateResponse {
        success: true,
        message: "Profile updated successfully",
        user: Value::Object(user),
    }))
}

pub async fn domains() -> Json<&'static [CareerDomain]> {
    Json(CAREER_DOMAINS)
}
