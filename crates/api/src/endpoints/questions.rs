//! Question endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use survey_common::AppResult;
use survey_core::{CreateQuestionInput, QuestionWithOptions, UpdateQuestionInput};
use survey_db::entities::question;

use crate::{
    extractors::{AuthUser, ConductorUser},
    middleware::ManagementState,
    response::{ApiResponse, no_content},
};

/// Create a question, optionally with its options.
async fn create(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Json(input): Json<CreateQuestionInput>,
) -> AppResult<ApiResponse<QuestionWithOptions>> {
    let question = state
        .question_service
        .create_question(user.actor(), input)
        .await?;
    Ok(ApiResponse::created(question))
}

async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<QuestionWithOptions>> {
    let question = state.question_service.get_question(id).await?;
    Ok(ApiResponse::ok(question))
}

async fn list_by_survey(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(survey_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<QuestionWithOptions>>> {
    let questions = state.question_service.list_by_survey(survey_id).await?;
    Ok(ApiResponse::ok(questions))
}

async fn update(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateQuestionInput>,
) -> AppResult<ApiResponse<question::Model>> {
    let question = state
        .question_service
        .update_question(user.actor(), id, input)
        .await?;
    Ok(ApiResponse::ok(question))
}

async fn delete(
    ConductorUser(user): ConductorUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state
        .question_service
        .delete_question(user.actor(), id)
        .await?;
    Ok(no_content())
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/survey/{survey_id}", get(list_by_survey))
}
