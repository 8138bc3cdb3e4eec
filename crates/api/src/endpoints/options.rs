//! Question option endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use survey_common::AppResult;
use survey_core::{BatchCreateOptionsInput, CreateOptionInput, UpdateOptionInput};
use survey_db::entities::question_option;

use crate::{
    extractors::{AuthUser, ConductorUser},
    middleware::ManagementState,
    response::{ApiResponse, no_content},
};

async fn create(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Json(input): Json<CreateOptionInput>,
) -> AppResult<ApiResponse<question_option::Model>> {
    let option = state
        .option_service
        .create_option(user.actor(), input)
        .await?;
    Ok(ApiResponse::created(option))
}

/// Add several options to one question in a single insert.
async fn batch_create(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Json(input): Json<BatchCreateOptionsInput>,
) -> AppResult<ApiResponse<Vec<question_option::Model>>> {
    let options = state
        .option_service
        .batch_create_options(user.actor(), input)
        .await?;
    Ok(ApiResponse::created(options))
}

async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<question_option::Model>> {
    let option = state.option_service.get_option(id).await?;
    Ok(ApiResponse::ok(option))
}

async fn list_by_question(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(question_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<question_option::Model>>> {
    let options = state.option_service.list_by_question(question_id).await?;
    Ok(ApiResponse::ok(options))
}

async fn update(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateOptionInput>,
) -> AppResult<ApiResponse<question_option::Model>> {
    let option = state
        .option_service
        .update_option(user.actor(), id, input)
        .await?;
    Ok(ApiResponse::ok(option))
}

async fn delete(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.option_service.delete_option(user.actor(), id).await?;
    Ok(no_content())
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(create))
        .route("/batch", post(batch_create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/question/{question_id}", get(list_by_question))
}
