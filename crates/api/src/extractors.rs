//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use survey_common::AppError;

use crate::middleware::Identity;

/// Authenticated caller extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Caller holding the `Conducting` or `Admin` role.
#[derive(Debug, Clone)]
pub struct ConductorUser(pub Identity);

impl<S> FromRequestParts<S> for ConductorUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if identity.can_conduct() {
            Ok(Self(identity))
        } else {
            Err(AppError::Forbidden(
                "Conducting or Admin role required".to_string(),
            ))
        }
    }
}
