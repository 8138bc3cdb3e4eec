//! Media upload endpoint.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use survey_common::{AppError, AppResult};
use survey_core::MediaUpload;

use crate::{extractors::ConductorUser, middleware::ManagementState, response::ApiResponse};

/// Upload a file via multipart form (`file` field).
async fn upload(
    ConductorUser(_user): ConductorUser,
    State(state): State<ManagementState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<MediaUpload>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();
        file = Some((file_name, content_type, data));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let upload = state
        .media_service
        .upload(&file_name, &content_type, &data)
        .await?;
    Ok(ApiResponse::created(upload))
}

pub fn router() -> Router<ManagementState> {
    Router::new()
        .route("/upload", post(upload))
        // Size is enforced by the service and the server's body limit layer
        .layer(DefaultBodyLimit::disable())
}
