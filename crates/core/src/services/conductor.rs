//! Conductor registration and e-mail verification.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use survey_common::{AppError, AppResult, VerificationCodeStore};
use survey_db::entities::conductor::{self, ConductorType};
use survey_db::repositories::ConductorRepository;
use tracing::{error, info, warn};
use validator::Validate;

use super::access::Actor;
use super::email::Mailer;
use super::role::RoleAssigner;

const VERIFICATION_SUBJECT: &str = "Your Verification Code";

/// Input for registering the caller as a conductor.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterConductorInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[serde(rename = "type")]
    pub conductor_type: ConductorType,
    pub description: Option<String>,
    #[validate(email)]
    pub contact_email: String,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[validate(email)]
    pub official_email: String,
}

/// Input for updating a conductor's profile.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateConductorInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,
    pub address: Option<String>,
}

/// A page of conductors.
#[derive(Debug, Clone, Serialize)]
pub struct ConductorPage {
    pub items: Vec<conductor::Model>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// Conductor service.
#[derive(Clone)]
pub struct ConductorService {
    conductor_repo: ConductorRepository,
    role_assigner: Arc<dyn RoleAssigner>,
    role_name: String,
    mailer: Arc<dyn Mailer>,
    code_store: Arc<dyn VerificationCodeStore>,
    code_ttl: Duration,
}

impl ConductorService {
    /// Create a new conductor service.
    #[must_use]
    pub fn new(
        conductor_repo: ConductorRepository,
        role_assigner: Arc<dyn RoleAssigner>,
        role_name: impl Into<String>,
        mailer: Arc<dyn Mailer>,
        code_store: Arc<dyn VerificationCodeStore>,
        code_ttl: Duration,
    ) -> Self {
        Self {
            conductor_repo,
            role_assigner,
            role_name: role_name.into(),
            mailer,
            code_store,
            code_ttl,
        }
    }

    /// Register the actor as a conductor and send a verification code.
    pub async fn register(
        &self,
        actor: Actor,
        input: RegisterConductorInput,
    ) -> AppResult<conductor::Model> {
        input.validate()?;

        if self
            .conductor_repo
            .find_by_user_id(actor.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "user is already registered as a conductor".to_string(),
            ));
        }
        if self
            .conductor_repo
            .find_by_official_email(&input.official_email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "official email is already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let conductor = self
            .conductor_repo
            .create(conductor::ActiveModel {
                user_id: Set(actor.user_id),
                name: Set(input.name),
                conductor_type: Set(input.conductor_type),
                description: Set(input.description),
                contact_email: Set(input.contact_email),
                contact_phone: Set(input.contact_phone),
                address: Set(input.address),
                official_email: Set(input.official_email),
                is_verified: Set(false),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await?;

        if let Err(e) = self
            .role_assigner
            .assign_role(actor.user_id, &self.role_name)
            .await
        {
            error!(conductor_id = conductor.id, error = %e, "Role assignment failed, removing conductor");
            self.conductor_repo.delete(conductor.id).await?;
            return Err(match e {
                AppError::ExternalService(_) => e,
                other => AppError::ExternalService(other.to_string()),
            });
        }

        info!(conductor_id = conductor.id, user_id = actor.user_id, "Registered conductor");

        let code = generate_code();
        self.code_store
            .put(&verification_key(conductor.id), &code, self.code_ttl)
            .await?;
        if let Err(e) = self
            .mailer
            .send(
                &conductor.official_email,
                VERIFICATION_SUBJECT,
                &verification_body(&code),
            )
            .await
        {
            warn!(conductor_id = conductor.id, error = %e, "Failed to send verification e-mail");
        }

        Ok(conductor)
    }

    /// Get a conductor.
    pub async fn get(&self, id: i32) -> AppResult<conductor::Model> {
        self.conductor_repo.get_by_id(id).await
    }

    /// Get the conductor registered by a user.
    pub async fn get_by_user(&self, user_id: i32) -> AppResult<conductor::Model> {
        self.conductor_repo
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Conductor for user {user_id}")))
    }

    /// Update a conductor's profile.
    pub async fn update(
        &self,
        actor: Actor,
        id: i32,
        input: UpdateConductorInput,
    ) -> AppResult<conductor::Model> {
        input.validate()?;

        let conductor = self.conductor_repo.get_by_id(id).await?;
        actor.ensure_can_manage(conductor.user_id, "conductor")?;

        let mut active: conductor::ActiveModel = conductor.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(email) = input.contact_email {
            active.contact_email = Set(email);
        }
        if let Some(phone) = input.contact_phone {
            active.contact_phone = Set(phone);
        }
        if let Some(address) = input.address {
            active.address = Set(address);
        }
        active.updated_at = Set(Utc::now().into());

        self.conductor_repo.update(active).await
    }

    /// Delete a conductor.
    pub async fn delete(&self, actor: Actor, id: i32) -> AppResult<()> {
        let conductor = self.conductor_repo.get_by_id(id).await?;
        actor.ensure_can_manage(conductor.user_id, "conductor")?;

        self.conductor_repo.delete(id).await?;
        self.code_store.remove(&verification_key(id)).await?;
        info!(conductor_id = id, "Deleted conductor");
        Ok(())
    }

    /// List conductors. Pages are 1-based.
    pub async fn list(&self, page: u64, limit: u64) -> AppResult<ConductorPage> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let (items, total) = self.conductor_repo.find_page(page - 1, limit).await?;

        Ok(ConductorPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Check a verification code and mark the conductor verified.
    pub async fn verify_email(&self, id: i32, code: &str) -> AppResult<conductor::Model> {
        let key = verification_key(id);
        let Some(stored) = self.code_store.get(&key).await? else {
            return Err(AppError::Validation(
                "invalid or expired verification code".to_string(),
            ));
        };
        if stored != code.trim() {
            return Err(AppError::Validation("invalid verification code".to_string()));
        }

        let conductor = self.conductor_repo.get_by_id(id).await?;
        let mut active: conductor::ActiveModel = conductor.into();
        active.is_verified = Set(true);
        active.updated_at = Set(Utc::now().into());
        let conductor = self.conductor_repo.update(active).await?;

        self.code_store.remove(&key).await?;
        info!(conductor_id = id, "Verified conductor e-mail");
        Ok(conductor)
    }
}

fn verification_key(conductor_id: i32) -> String {
    format!("conductor_verification:{conductor_id}")
}

/// Six lowercase hex characters.
fn generate_code() -> String {
    format!("{:06x}", rand::thread_rng().gen_range(0..=0xFF_FFFF_u32))
}

fn verification_body(code: &str) -> String {
    format!("Hello,\n\nYour verification code is: {code}\n\nBest regards,\nTeam")
}
