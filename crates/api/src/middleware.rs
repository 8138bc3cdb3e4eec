//! API middleware and router state.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use survey_common::config::AuthConfig;
use survey_core::{
    Actor, AnswerService, ConductorService, DraftService, MediaService, OptionService,
    QuestionService, ResultsService, SessionService, SurveyService,
};
use tracing::debug;

/// Role that grants access to every resource.
pub const ADMIN_ROLE: &str = "Admin";
/// Role held by survey conductors.
pub const CONDUCTING_ROLE: &str = "Conducting";

/// State of the participants service.
#[derive(Clone)]
pub struct ParticipantsState {
    pub session_service: SessionService,
    pub verifier: TokenVerifier,
}

/// State of the survey management service.
#[derive(Clone)]
pub struct ManagementState {
    pub survey_service: SurveyService,
    pub draft_service: DraftService,
    pub question_service: QuestionService,
    pub option_service: OptionService,
    pub answer_service: AnswerService,
    pub media_service: MediaService,
    pub results_service: ResultsService,
    pub conductor_service: ConductorService,
    pub verifier: TokenVerifier,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub roles: Vec<String>,
}

impl Identity {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Conductors and admins may author surveys.
    #[must_use]
    pub fn can_conduct(&self) -> bool {
        self.is_admin() || self.has_role(CONDUCTING_ROLE)
    }

    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.is_admin())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(alias = "userID")]
    sub: NumberOrString,
    #[serde(default, alias = "roles")]
    role: Option<OneOrMany>,
}

impl Claims {
    fn into_identity(self) -> Option<Identity> {
        let user_id = match self.sub {
            NumberOrString::Number(n) => i32::try_from(n).ok()?,
            NumberOrString::String(s) => s.trim().parse().ok()?,
        };
        let roles = match self.role {
            None => vec![],
            Some(OneOrMany::One(role)) => vec![role],
            Some(OneOrMany::Many(roles)) => roles,
        };
        Some(Identity { user_id, roles })
    }
}

#[derive(Clone)]
enum Mode {
    Jwt {
        key: Arc<DecodingKey>,
        validation: Arc<Validation>,
    },
    Development(Identity),
}

/// Turns bearer tokens into identities.
#[derive(Clone)]
pub struct TokenVerifier {
    mode: Mode,
}

impl TokenVerifier {
    /// Verify HS256 tokens signed with `secret`.
    #[must_use]
    pub fn hs256(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not demanded.
        validation.required_spec_claims = HashSet::new();
        validation.validate_aud = false;

        Self {
            mode: Mode::Jwt {
                key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
                validation: Arc::new(validation),
            },
        }
    }

    /// Treat every request as coming from `identity`.
    #[must_use]
    pub const fn development(identity: Identity) -> Self {
        Self {
            mode: Mode::Development(identity),
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        match &config.jwt_secret {
            Some(secret) => Self::hs256(secret),
            None => Self::development(Identity {
                user_id: config.dev_user_id,
                roles: config.dev_roles.clone(),
            }),
        }
    }

    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self.mode, Mode::Development(_))
    }

    /// Resolve the caller from an optional bearer token.
    #[must_use]
    pub fn identify(&self, token: Option<&str>) -> Option<Identity> {
        match &self.mode {
            Mode::Development(identity) => Some(identity.clone()),
            Mode::Jwt { key, validation } => {
                let token = token?;
                match decode::<Claims>(token, key, validation) {
                    Ok(data) => data.claims.into_identity(),
                    Err(e) => {
                        debug!(error = %e, "Rejected bearer token");
                        None
                    }
                }
            }
        }
    }
}

/// Authentication middleware.
///
/// Stores an [`Identity`] in the request extensions when the caller can be
/// identified. Routes that need one reject the request later.
pub async fn auth_middleware(
    State(verifier): State<TokenVerifier>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req.headers().typed_get::<Authorization<Bearer>>();
    let token = bearer.as_ref().map(|auth| auth.token());

    if let Some(identity) = verifier.identify(token) {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn token(claims: &serde_json::Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_string_subject_and_single_role() {
        let verifier = TokenVerifier::hs256("secret");
        let t = token(&json!({"sub": "42", "role": "Conducting"}), "secret");

        let identity = verifier.identify(Some(&t)).unwrap();

        assert_eq!(identity.user_id, 42);
        assert!(identity.can_conduct());
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_numeric_subject_and_role_list() {
        let verifier = TokenVerifier::hs256("secret");
        let t = token(&json!({"sub": 7, "role": ["Participant", "Admin"]}), "secret");

        let identity = verifier.identify(Some(&t)).unwrap();

        assert_eq!(identity.user_id, 7);
        assert!(identity.is_admin());
        assert!(identity.actor().is_admin);
    }

    #[test]
    fn test_user_id_claim_alias() {
        let verifier = TokenVerifier::hs256("secret");
        let t = token(&json!({"userID": 9}), "secret");

        assert_eq!(verifier.identify(Some(&t)).unwrap().user_id, 9);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = TokenVerifier::hs256("secret");
        let t = token(&json!({"sub": "1"}), "other");

        assert!(verifier.identify(Some(&t)).is_none());
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::hs256("secret");
        let t = token(&json!({"sub": "1", "exp": 1_000_000}), "secret");

        assert!(verifier.identify(Some(&t)).is_none());
    }

    #[test]
    fn test_missing_token_rejected() {
        assert!(TokenVerifier::hs256("secret").identify(None).is_none());
    }

    #[test]
    fn test_development_mode_ignores_token() {
        let verifier = TokenVerifier::from_config(&AuthConfig {
            jwt_secret: None,
            dev_user_id: 5,
            dev_roles: vec!["Conducting".to_string()],
        });

        assert!(verifier.is_development());
        let identity = verifier.identify(None).unwrap();
        assert_eq!(identity.user_id, 5);
        assert!(identity.can_conduct());
    }
}
