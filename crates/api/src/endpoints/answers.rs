//! Answer endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;
use survey_common::AppResult;
use survey_core::{BulkAnswersInput, CreateAnswerInput};
use survey_db::entities::answer;

use crate::{extractors::AuthUser, middleware::ManagementState, response::ApiResponse};

/// Bulk insert response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAnswersResponse {
    pub answers_saved: u64,
}

async fn create(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Json(input): Json<CreateAnswerInput>,
) -> AppResult<ApiResponse<answer::Model>> {
    let answer = state.answer_service.create_answer(input).await?;
    Ok(ApiResponse::created(answer))
}

async fn bulk(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Json(input): Json<BulkAnswersInput>,
) -> AppResult<ApiResponse<BulkAnswersResponse>> {
    let answers_saved = state.answer_service.submit_bulk_answers(input).await?;
    Ok(ApiResponse::created(BulkAnswersResponse { answers_saved }))
}

async fn list_by_session(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(session_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<answer::Model>>> {
    let answers = state.answer_service.list_by_session(session_id).await?;
    Ok(ApiResponse::ok(answers))
}

async fn list_by_question(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(question_id): Path<i32>,
) -> AppResult<ApiResponse<Vec<answer::Model>>> {
    let answers = state.answer_service.list_by_question(question_id).await?;
    Ok(ApiResponse::ok(answers))
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(create))
        .route("/bulk", post(bulk))
        .route("/session/{session_id}", get(list_by_session))
        .route("/question/{question_id}", get(list_by_question))
}
