use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use genesis_advisor::FALLBACK_ROLES;

use crate::error::ApiError;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    domains: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    recommendations: Vec<String>,
}

fn fallback() -> Vec<String> {
    FALLBACK_ROLES.iter().map(|role| role.to_string()).collect()
}

/// Suggests roles for the selected domains, never surfacing provider failures.
pub async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            counter!("advisor_requests_total", "result" => "fallback").increment(1);
            warn!(stage = "advisor", error = %rejection.body_text(), "unreadable request; serving fallback");
            return Ok(Json(RecommendationResponse {
                recommendations: fallback(),
            }));
        }
    };

    let domains = request.domains.unwrap_or_default();
    if domains.is_empty() {
        return Err(ApiError::bad_request("No domains provided"));
    }

    let Some(advisor) = state.advisor() else {
        counter!("advisor_requests_total", "result" => "disabled").increment(1);
        return Ok(Json(RecommendationResponse {
            recommendations: fallback(),
        }));
    };

    let recommendations = match advisor.recommend_roles(&domains).await {
        Ok(roles) => {
            counter!("advisor_requests_total", "result" => "ok").increment(1);
            info!(stage = "advisor", model = advisor.model(), count = roles.len(), "recommendations received");
            roles
        }
        Err(err) => {
            counter!("advisor_requests_total", "result" => "fallback").increment(1);
            warn!(stage = "advisor", error = %err, "recommendation provider failed; serving fallback");
            fallback()
        }
    };

    Ok(Json(RecommendationResponse { recommendations }))
}
