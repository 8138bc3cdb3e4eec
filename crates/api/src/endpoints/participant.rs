//! Participant session endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use survey_common::AppResult;
use survey_core::{SaveDraftInput, SessionView, SubmitInput, SubmitOutcome};
use survey_db::entities::participant_survey_draft;

use crate::{extractors::AuthUser, middleware::ParticipantsState, response::ApiResponse};

/// Start a new session or resume the open one.
async fn start_or_resume(
    AuthUser(user): AuthUser,
    State(state): State<ParticipantsState>,
    Path(survey_id): Path<i32>,
) -> AppResult<ApiResponse<SessionView>> {
    let view = state
        .session_service
        .start_or_resume(survey_id, user.user_id)
        .await?;
    Ok(ApiResponse::ok(view))
}

async fn current_session(
    AuthUser(user): AuthUser,
    State(state): State<ParticipantsState>,
    Path(survey_id): Path<i32>,
) -> AppResult<ApiResponse<SessionView>> {
    let view = state
        .session_service
        .get_current_session(survey_id, user.user_id)
        .await?;
    Ok(ApiResponse::ok(view))
}

/// Upsert the session's draft answers.
async fn save_draft(
    AuthUser(user): AuthUser,
    State(state): State<ParticipantsState>,
    Path(session_id): Path<i32>,
    Json(input): Json<SaveDraftInput>,
) -> AppResult<ApiResponse<participant_survey_draft::Model>> {
    let draft = state
        .session_service
        .save_draft(session_id, user.user_id, input)
        .await?;
    Ok(ApiResponse::ok(draft))
}

async fn get_draft(
    AuthUser(user): AuthUser,
    State(state): State<ParticipantsState>,
    Path(session_id): Path<i32>,
) -> AppResult<ApiResponse<participant_survey_draft::Model>> {
    let draft = state
        .session_service
        .get_draft(session_id, user.user_id)
        .await?;
    Ok(ApiResponse::ok(draft))
}

/// Submit the session's answers and complete it.
async fn submit(
    AuthUser(user): AuthUser,
    State(state): State<ParticipantsState>,
    Path(session_id): Path<i32>,
    Json(input): Json<SubmitInput>,
) -> AppResult<ApiResponse<SubmitOutcome>> {
    let outcome = state
        .session_service
        .submit(session_id, user.user_id, input)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub fn router() -> Router<ParticipantsState> {
    Router::new()
        .route(
            "/surveys/{survey_id}/session",
            post(start_or_resume).get(current_session),
        )
        .route("/sessions/{session_id}/draft", get(get_draft).put(save_draft))
        .route("/sessions/{session_id}/submit", post(submit))
}
