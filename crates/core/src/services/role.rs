//! Role assignment through the Auth service.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use survey_common::config::AuthServiceConfig;
use survey_common::{AppError, AppResult};
use tracing::{debug, info};

/// Grants roles to users.
#[async_trait::async_trait]
pub trait RoleAssigner: Send + Sync {
    /// Grant `role_name` to `user_id`.
    async fn assign_role(&self, user_id: i32, role_name: &str) -> AppResult<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignRoleRequest<'a> {
    user_id: i32,
    role_name: &'a str,
}

/// HTTP client for the Auth service.
#[derive(Clone)]
pub struct AuthServiceClient {
    http_client: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
}

impl AuthServiceClient {
    /// Create a client for the Auth service at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        service_token: Option<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_token,
        })
    }

    /// Create a client from configuration. Returns `None` when no base URL is set.
    pub fn from_config(config: &AuthServiceConfig) -> AppResult<Option<Self>> {
        config
            .base_url
            .as_ref()
            .map(|url| {
                Self::new(
                    url.clone(),
                    config.service_token.clone(),
                    Duration::from_secs(config.timeout_secs),
                )
            })
            .transpose()
    }

    fn roles_url(&self, user_id: i32) -> String {
        format!("{}/api/Auth/users/{user_id}/roles", self.base_url)
    }
}

#[async_trait::async_trait]
impl RoleAssigner for AuthServiceClient {
    async fn assign_role(&self, user_id: i32, role_name: &str) -> AppResult<()> {
        let mut request = self
            .http_client
            .post(self.roles_url(user_id))
            .json(&AssignRoleRequest { user_id, role_name });
        if let Some(token) = &self.service_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Auth service request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Auth service returned {status}: {body}"
            )));
        }

        info!(user_id, role = role_name, "Assigned role");
        Ok(())
    }
}

/// Role assigner that does nothing. Used when no Auth service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRoleAssigner;

#[async_trait::async_trait]
impl RoleAssigner for NoOpRoleAssigner {
    async fn assign_role(&self, user_id: i32, role_name: &str) -> AppResult<()> {
        debug!(user_id, role = role_name, "Auth service not configured, skipping role assignment");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_url() {
        let client =
            AuthServiceClient::new("http://auth.local/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.roles_url(42), "http://auth.local/api/Auth/users/42/roles");
    }

    #[test]
    fn test_from_config_without_base_url() {
        let config = AuthServiceConfig::default();
        assert!(AuthServiceClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_request_body_is_camel_case() {
        let body = serde_json::to_value(AssignRoleRequest {
            user_id: 5,
            role_name: "Conducting",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"userId": 5, "roleName": "Conducting"}));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_external_error() {
        let client =
            AuthServiceClient::new("http://127.0.0.1:1", None, Duration::from_secs(2)).unwrap();

        let result = client.assign_role(5, "Conducting").await;

        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
