//! Answer option service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use survey_common::{AppError, AppResult};
use survey_db::entities::question_option;
use survey_db::repositories::{OptionRepository, QuestionRepository, SurveyRepository};
use validator::Validate;

use super::access::Actor;

/// Input for creating an option.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOptionInput {
    pub question_id: i32,
    #[validate(length(min = 1, max = 1024))]
    pub option_text: String,
}

/// Input for creating several options of one question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchCreateOptionsInput {
    pub question_id: i32,
    #[validate(length(min = 1))]
    pub options: Vec<String>,
}

/// Input for updating an option.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOptionInput {
    #[validate(length(min = 1, max = 1024))]
    pub option_text: String,
}

/// Option service.
#[derive(Clone)]
pub struct OptionService {
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    option_repo: OptionRepository,
}

impl OptionService {
    /// Create a new option service.
    #[must_use]
    pub const fn new(
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        option_repo: OptionRepository,
    ) -> Self {
        Self {
            survey_repo,
            question_repo,
            option_repo,
        }
    }

    /// Add an option to a question.
    pub async fn create_option(
        &self,
        actor: Actor,
        input: CreateOptionInput,
    ) -> AppResult<question_option::Model> {
        input.validate()?;
        self.ensure_question_owner(actor, input.question_id).await?;

        let now = Utc::now();
        self.option_repo
            .create(question_option::ActiveModel {
                question_id: Set(input.question_id),
                option_text: Set(input.option_text),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await
    }

    /// Add several options to a question in one insert.
    pub async fn batch_create_options(
        &self,
        actor: Actor,
        input: BatchCreateOptionsInput,
    ) -> AppResult<Vec<question_option::Model>> {
        input.validate()?;
        if input.options.iter().any(|text| text.trim().is_empty()) {
            return Err(AppError::Validation("option text cannot be empty".to_string()));
        }
        self.ensure_question_owner(actor, input.question_id).await?;

        let now = Utc::now();
        let models = input
            .options
            .into_iter()
            .map(|text| question_option::ActiveModel {
                question_id: Set(input.question_id),
                option_text: Set(text),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .collect();

        self.option_repo.create_many_returning(models).await
    }

    /// Get an option.
    pub async fn get_option(&self, id: i32) -> AppResult<question_option::Model> {
        self.option_repo.get_by_id(id).await
    }

    /// List the options of a question.
    pub async fn list_by_question(
        &self,
        question_id: i32,
    ) -> AppResult<Vec<question_option::Model>> {
        self.option_repo.find_by_question(question_id).await
    }

    /// Change an option's text.
    pub async fn update_option(
        &self,
        actor: Actor,
        id: i32,
        input: UpdateOptionInput,
    ) -> AppResult<question_option::Model> {
        input.validate()?;

        let option = self.option_repo.get_by_id(id).await?;
        self.ensure_question_owner(actor, option.question_id).await?;

        let mut active: question_option::ActiveModel = option.into();
        active.option_text = Set(input.option_text);
        active.updated_at = Set(Utc::now().into());

        self.option_repo.update(active).await
    }

    /// Delete an option.
    pub async fn delete_option(&self, actor: Actor, id: i32) -> AppResult<()> {
        let option = self.option_repo.get_by_id(id).await?;
        self.ensure_question_owner(actor, option.question_id).await?;

        self.option_repo.delete(id).await?;
        Ok(())
    }

    async fn ensure_question_owner(&self, actor: Actor, question_id: i32) -> AppResult<()> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let survey = self.survey_repo.get_by_id(question.survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")
    }
}
