//! API endpoints.

mod answers;
mod conductors;
mod drafts;
mod health;
mod media;
mod options;
mod participant;
mod questions;
mod surveys;

use axum::{Router, middleware::from_fn_with_state};

use crate::middleware::{ManagementState, ParticipantsState, auth_middleware};

/// Create the participants service router.
pub fn participants_router(state: ParticipantsState) -> Router {
    Router::new()
        .nest("/api/participant", participant::router())
        .layer(from_fn_with_state(state.verifier.clone(), auth_middleware))
        .merge(health::router())
        .with_state(state)
}

/// Create the survey management service router.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        .nest("/api/surveys", surveys::router())
        .nest("/api/questions", questions::router())
        .nest("/api/options", options::router())
        .nest("/api/answers", answers::router())
        .nest("/api/v1/drafts", drafts::router())
        .nest("/api/v1/media", media::router())
        .nest("/api/v1/conductors", conductors::router())
        .layer(from_fn_with_state(state.verifier.clone(), auth_middleware))
        .merge(health::router())
        .with_state(state)
}
