use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use genesis_core::types::MembershipRole;
use genesis_storage::{CommunityError, CommunityStore, NewCommunity, NewMembership};

use crate::error::ApiError;
use crate::router::AppState;

/// Resolves domain slugs to communities and enrols a user in each.
///
/// Domains are handled one at a time in input order. A failed community
/// insert or membership upsert skips that domain only; a failed lookup
/// aborts the whole call. Nothing is rolled back.
#[derive(Clone)]
pub struct CommunityAssigner<S> {
    store: S,
    clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl<S: CommunityStore> CommunityAssigner<S> {
    pub fn new(store: S, clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>) -> Self {
        Self { store, clock }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub async fn assign(
        &self,
        user_id: &str,
        domains: &[String],
    ) -> Result<AssignOutcome, AssignError> {
        if user_id.trim().is_empty() {
            return Err(AssignError::InvalidUser);
        }

        let mut community_ids = Vec::with_capacity(domains.len());

        for domain in domains {
            let existing = self
                .store
                .find_by_slug(domain)
                .await
                .map_err(AssignError::Lookup)?;

            let community = match existing {
                Some(community) => community,
                None => {
                    let record = NewCommunity::for_domain(domain, self.now());
                    match self.store.insert_community(record).await {
                        Ok(community) => {
                            info!(
                                stage = "assign",
                                domain = %domain,
                                community_id = %community.id,
                                name = %community.name,
                                "community created"
                            );
                            community
                        }
                        Err(err) => {
                            warn!(stage = "assign", domain = %domain, error = %err, "failed to create community");
                            counter!("community_assignments_total", "outcome" => "create_failed")
                                .increment(1);
                            continue;
                        }
                    }
                }
            };

            let membership = NewMembership {
                user_id,
                community_id: &community.id,
                role: MembershipRole::Member,
                updated_at: self.now(),
            };
            match self.store.upsert_membership(membership).await {
                Ok(()) => {
                    counter!("community_assignments_total", "outcome" => "assigned").increment(1);
                    community_ids.push(community.id);
                }
                Err(err) => {
                    warn!(
                        stage = "assign",
                        domain = %domain,
                        community_id = %community.id,
                        error = %err,
                        "failed to upsert membership"
                    );
                    counter!("community_assignments_total", "outcome" => "membership_failed")
                        .increment(1);
                }
            }
        }

        Ok(AssignOutcome { community_ids })
    }
}

/// Communities the user was enrolled in, one entry per successful domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssignOutcome {
    pub community_ids: Vec<String>,
}

impl AssignOutcome {
    pub fn assigned_count(&self) -> usize {
        self.community_ids.len()
    }
}

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("user id must not be empty")]
    InvalidUser,
    #[error("failed to look up community: {0}")]
    Lookup(#[source] CommunityError),
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    domains: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    success: bool,
    assigned_communities: usize,
}

pub async fn handle(
    State(state): State<AppState>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        counter!("community_assign_requests_total", "result" => "invalid").increment(1);
        ApiError::bad_request(format!("invalid request body: {}", rejection.body_text()))
    })?;

    let (Some(user_id), Some(domains)) = (request.user_id, request.domains) else {
        counter!("community_assign_requests_total", "result" => "invalid").increment(1);
        return Err(ApiError::bad_request("userId and domains are required"));
    };

    match state.assigner().assign(&user_id, &domains).await {
        Ok(outcome) => {
            counter!("community_assign_requests_total", "result" => "ok").increment(1);
            info!(
                stage = "assign",
                user_id = %user_id,
                requested = domains.len(),
                assigned = outcome.assigned_count(),
                "communities assigned"
            );
            Ok(Json(AssignResponse {
                success: true,
                assigned_communities: outcome.assigned_count(),
            }))
        }
        Err(AssignError::InvalidUser) => {
            counter!("community_assign_requests_total", "result" => "invalid").increment(1);
            Err(ApiError::bad_request("userId must not be empty"))
        }
        Err(err) => {
            counter!("community_assign_requests_total", "result" => "error").increment(1);
            error!(stage = "assign", user_id = %user_id, error = %err, "community assignment failed");
            Err(ApiError::internal("Failed to assign communities"))
        }
    }
}
