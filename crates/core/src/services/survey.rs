//! Survey service.

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use survey_common::{AppError, AppResult};
use survey_db::entities::{
    survey::{self, SurveyStatus},
    survey_requirement,
};
use survey_db::repositories::{
    OptionRepository, QuestionRepository, SurveyDraftRepository, SurveyMediaFileRepository,
    SurveyRepository, SurveyRequirementRepository,
};
use tracing::info;
use validator::Validate;

use super::access::Actor;
use super::question::{QuestionWithOptions, attach_options};

/// A participant requirement.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequirementInput {
    #[validate(length(min = 1, max = 256))]
    pub skill_name: String,
    #[serde(default)]
    pub min_proficiency_level: i32,
    #[serde(default)]
    pub experience_level: String,
}

/// Input for creating a survey.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurveyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_self_recruitment: bool,
    #[serde(default)]
    #[validate(nested)]
    pub requirements: Vec<RequirementInput>,
}

/// Input for updating a survey.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurveyInput {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_self_recruitment: Option<bool>,
}

/// A survey with its requirements and questions.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyDetail {
    #[serde(flatten)]
    pub survey: survey::Model,
    pub requirements: Vec<survey_requirement::Model>,
    pub questions: Vec<QuestionWithOptions>,
}

/// Authoring progress of a survey.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyProgress {
    pub survey_id: i32,
    pub basic_info_complete: bool,
    pub questions_count: u64,
    pub media_count: u64,
    pub last_saved: chrono::DateTime<chrono::FixedOffset>,
    pub status: SurveyStatus,
}

/// Survey service.
#[derive(Clone)]
pub struct SurveyService {
    db: Arc<DatabaseConnection>,
    survey_repo: SurveyRepository,
    requirement_repo: SurveyRequirementRepository,
    question_repo: QuestionRepository,
    option_repo: OptionRepository,
    media_repo: SurveyMediaFileRepository,
    draft_repo: SurveyDraftRepository,
}

impl SurveyService {
    /// Create a new survey service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        survey_repo: SurveyRepository,
        requirement_repo: SurveyRequirementRepository,
        question_repo: QuestionRepository,
        option_repo: OptionRepository,
        media_repo: SurveyMediaFileRepository,
        draft_repo: SurveyDraftRepository,
    ) -> Self {
        Self {
            db,
            survey_repo,
            requirement_repo,
            question_repo,
            option_repo,
            media_repo,
            draft_repo,
        }
    }

    /// Create an unpublished survey owned by the actor.
    pub async fn create_survey(
        &self,
        actor: Actor,
        input: CreateSurveyInput,
    ) -> AppResult<SurveyDetail> {
        input.validate()?;

        let now = Utc::now();
        let survey = self
            .survey_repo
            .create(survey::ActiveModel {
                conductor_id: Set(actor.user_id),
                title: Set(input.title),
                description: Set(input.description),
                is_self_recruitment: Set(input.is_self_recruitment),
                status: Set(SurveyStatus::Draft),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await?;

        let requirements = input
            .requirements
            .into_iter()
            .map(|r| survey_requirement::ActiveModel {
                survey_id: Set(survey.id),
                skill_name: Set(r.skill_name),
                min_proficiency_level: Set(r.min_proficiency_level),
                experience_level: Set(r.experience_level),
                ..Default::default()
            })
            .collect();
        self.requirement_repo
            .create_many_with(self.db.as_ref(), requirements)
            .await?;

        info!(survey_id = survey.id, conductor_id = actor.user_id, "Created survey");

        let requirements = self.requirement_repo.find_by_survey(survey.id).await?;
        Ok(SurveyDetail {
            survey,
            requirements,
            questions: vec![],
        })
    }

    /// Get a survey with its requirements and questions.
    pub async fn get_survey(&self, id: i32) -> AppResult<SurveyDetail> {
        let survey = self.survey_repo.get_by_id(id).await?;
        let requirements = self.requirement_repo.find_by_survey(id).await?;
        let questions = self.question_repo.find_by_survey(id).await?;
        let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
        let options = self.option_repo.find_by_questions(&ids).await?;

        Ok(SurveyDetail {
            survey,
            requirements,
            questions: attach_options(questions, options),
        })
    }

    /// List surveys: the actor's own, or every survey for admins.
    pub async fn list_surveys(
        &self,
        actor: Actor,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<survey::Model>> {
        let limit = limit.clamp(1, 100);
        if actor.is_admin {
            self.survey_repo.find_all(limit, offset).await
        } else {
            self.survey_repo
                .find_by_conductor(actor.user_id, limit, offset)
                .await
        }
    }

    /// Update a survey's basic fields.
    pub async fn update_survey(
        &self,
        actor: Actor,
        id: i32,
        input: UpdateSurveyInput,
    ) -> AppResult<survey::Model> {
        input.validate()?;

        let survey = self.survey_repo.get_by_id(id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        let mut active: survey::ActiveModel = survey.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(flag) = input.is_self_recruitment {
            active.is_self_recruitment = Set(flag);
        }
        active.updated_at = Set(Utc::now().into());

        self.survey_repo.update(active).await
    }

    /// Delete a survey and everything attached to it.
    pub async fn delete_survey(&self, actor: Actor, id: i32) -> AppResult<()> {
        let survey = self.survey_repo.get_by_id(id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        self.survey_repo.delete(id).await?;
        info!(survey_id = id, "Deleted survey");
        Ok(())
    }

    /// Publish a survey that already has questions.
    pub async fn publish_survey(&self, actor: Actor, id: i32) -> AppResult<survey::Model> {
        let survey = self.survey_repo.get_by_id(id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        if self.question_repo.count_by_survey(id).await? == 0 {
            return Err(AppError::Validation(
                "cannot publish survey without questions".to_string(),
            ));
        }

        let survey = self
            .survey_repo
            .set_status(survey, SurveyStatus::Published)
            .await?;
        info!(survey_id = id, "Published survey");
        Ok(survey)
    }

    /// Report how far authoring of a survey has got.
    pub async fn get_progress(&self, id: i32) -> AppResult<SurveyProgress> {
        let survey = self.survey_repo.get_by_id(id).await?;
        let questions_count = self.question_repo.count_by_survey(id).await?;
        let media_count = self.media_repo.count_authored_by_survey(id).await?;
        let last_saved = self
            .draft_repo
            .find_latest_by_survey(id)
            .await?
            .map_or(survey.updated_at, |draft| draft.last_saved);

        Ok(SurveyProgress {
            survey_id: survey.id,
            basic_info_complete: !survey.title.trim().is_empty()
                && !survey.description.trim().is_empty(),
            questions_count,
            media_count,
            last_saved,
            status: survey.status,
        })
    }
}
