//! Conductor endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use survey_common::AppResult;
use survey_core::{ConductorPage, RegisterConductorInput, UpdateConductorInput};
use survey_db::entities::conductor;

use crate::{
    extractors::AuthUser,
    middleware::ManagementState,
    response::{ApiResponse, no_content},
};

/// List conductors query.
#[derive(Debug, Deserialize)]
pub struct ListConductorsQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> u64 {
    10
}

/// Verify e-mail request.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub code: String,
}

// ==================== Handlers ====================

/// Register the caller as a conductor.
async fn register(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Json(input): Json<RegisterConductorInput>,
) -> AppResult<ApiResponse<conductor::Model>> {
    let conductor = state
        .conductor_service
        .register(user.actor(), input)
        .await?;
    Ok(ApiResponse::created(conductor))
}

async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Query(query): Query<ListConductorsQuery>,
) -> AppResult<ApiResponse<ConductorPage>> {
    let page = state
        .conductor_service
        .list(query.page, query.limit)
        .await?;
    Ok(ApiResponse::ok(page))
}

async fn show(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<ApiResponse<conductor::Model>> {
    let conductor = state.conductor_service.get(id).await?;
    Ok(ApiResponse::ok(conductor))
}

/// The caller's own conductor profile.
async fn me(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
) -> AppResult<ApiResponse<conductor::Model>> {
    let conductor = state.conductor_service.get_by_user(user.user_id).await?;
    Ok(ApiResponse::ok(conductor))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(input): Json<UpdateConductorInput>,
) -> AppResult<ApiResponse<conductor::Model>> {
    let conductor = state
        .conductor_service
        .update(user.actor(), id, input)
        .await?;
    Ok(ApiResponse::ok(conductor))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.conductor_service.delete(user.actor(), id).await?;
    Ok(no_content())
}

async fn verify(
    AuthUser(_user): AuthUser,
    State(state): State<ManagementState>,
    Path(id): Path<i32>,
    Json(req): Json<VerifyEmailRequest>,
) -> AppResult<ApiResponse<conductor::Model>> {
    let conductor = state
        .conductor_service
        .verify_email(id, &req.code)
        .await?;
    Ok(ApiResponse::ok(conductor))
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/", post(register).get(list))
        .route("/me", get(me))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/verify", post(verify))
}
