//! Survey endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use survey_common::AppResult;
use survey_core::{
    CombinedResults, CreateSurveyInput, QuestionResult, SurveyDetail, SurveyProgress,
    SurveySummary, UpdateSurveyInput,
};
use survey_db::entities::survey;

use crate::{
    extractors::{AuthUser, ConductorUser},
    middleware::ManagementState,
    response::{ApiResponse, no_content},
};

/// List surveys query.
#[derive(Debug, Deserialize)]
pub struct ListSurveysQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    20
}

// ==================== Handlers ====================

async fn create(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Json(input): Json<CreateSurveyInput>,
) -> AppResult<ApiResponse<SurveyDetail>> {
    let detail = state
        .survey_service
        .create_survey(user.actor(), input)
        .await?;
    Ok(ApiResponse::created(detail))
}

async fn list(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Query(query): Query<ListSurveysQuery>,
) -> AppResult<ApiResponse<Vec<survey::Model>>> {
    let surveys = state
        .survey_service
        .list_surveys(user.actor(), query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(surveys))
}

async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<SurveyDetail>> {
    let detail = state.survey_service.get_survey(id).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateSurveyInput>,
) -> AppResult<ApiResponse<survey::Model>> {
    let survey = state
        .survey_service
        .update_survey(user.actor(), id, input)
        .await?;
    Ok(ApiResponse::ok(survey))
}

async fn delete(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.survey_service.delete_survey(user.actor(), id).await?;
    Ok(no_content())
}

async fn publish(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<survey::Model>> {
    let survey = state
        .survey_service
        .publish_survey(user.actor(), id)
        .await?;
    Ok(ApiResponse::ok(survey))
}

async fn progress(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<SurveyProgress>> {
    let progress = state.survey_service.get_progress(id).await?;
    Ok(ApiResponse::ok(progress))
}

async fn summary(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<SurveySummary>> {
    let summary = state.results_service.summary(user.actor(), id).await?;
    Ok(ApiResponse::ok(summary))
}

async fn detailed_results(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<Vec<QuestionResult>>> {
    let results = state.results_service.detailed(user.actor(), id).await?;
    Ok(ApiResponse::ok(results))
}

async fn combined_results(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<CombinedResults>> {
    let results = state.results_service.combined(user.actor(), id).await?;
    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/publish", post(publish))
        .route("/{id}/progress", get(progress))
        // Results
        .route("/{id}/summary", get(summary))
        .route("/{id}/detailed-results", get(detailed_results))
        .route("/{id}/results", get(combined_results))
}
