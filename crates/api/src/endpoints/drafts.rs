//! Survey draft endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use survey_common::AppResult;
use survey_core::{CreateDraftInput, PublishOutcome, UpdateDraftInput};
use survey_db::entities::survey_draft;

use crate::{
    extractors::{AuthUser, ConductorUser},
    middleware::ManagementState,
    response::ApiResponse,
};

/// List drafts query.
#[derive(Debug, Deserialize)]
pub struct ListDraftsQuery {
    pub survey_id: Option<i32>,
}

async fn create(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Json(input): Json<CreateDraftInput>,
) -> AppResult<ApiResponse<survey_draft::Model>> {
    let draft = state.draft_service.create_draft(user.actor(), input).await?;
    Ok(ApiResponse::created(draft))
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Query(query): Query<ListDraftsQuery>,
) -> AppResult<ApiResponse<Vec<survey_draft::Model>>> {
    let drafts = state
        .draft_service
        .list_drafts(user.actor(), query.survey_id)
        .await?;
    Ok(ApiResponse::ok(drafts))
}

async fn show(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<survey_draft::Model>> {
    let draft = state.draft_service.get_draft(user.actor(), id).await?;
    Ok(ApiResponse::ok(draft))
}

async fn update(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateDraftInput>,
) -> AppResult<ApiResponse<survey_draft::Model>> {
    let draft = state
        .draft_service
        .update_draft(user.actor(), id, input)
        .await?;
    Ok(ApiResponse::ok(draft))
}

async fn latest(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Path(survey_id): Path<i32>,
) -> AppResult<ApiResponse<survey_draft::Model>> {
    let draft = state
        .draft_service
        .get_latest_draft(user.actor(), survey_id)
        .await?;
    Ok(ApiResponse::ok(draft))
}

/// Turn a draft into a published survey.
async fn publish(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<PublishOutcome>> {
    let outcome = state.draft_service.publish_draft(user.actor(), id).await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/latest/{survey_id}", get(latest))
        .route("/{id}", get(show).put(update))
        .route("/{id}/publish", post(publish))
}
