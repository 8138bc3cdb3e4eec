//! Survey draft repository.

use std::sync::Arc;

use crate::entities::{SurveyDraft, survey_draft};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use survey_common::{AppError, AppResult};

/// Survey draft repository.
#[derive(Clone)]
pub struct SurveyDraftRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyDraftRepository {
    /// Create a new survey draft repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a draft by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<survey_draft::Model>> {
        SurveyDraft::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a draft by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<survey_draft::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draft not found: {id}")))
    }

    /// Find a draft and lock its row until the transaction ends.
    pub async fn find_for_update_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> AppResult<Option<survey_draft::Model>> {
        SurveyDraft::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recently saved draft of a survey.
    pub async fn find_latest_by_survey(
        &self,
        survey_id: i32,
    ) -> AppResult<Option<survey_draft::Model>> {
        SurveyDraft::find()
            .filter(survey_draft::Column::SurveyId.eq(survey_id))
            .order_by_desc(survey_draft::Column::LastSaved)
            .order_by_desc(survey_draft::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List drafts, optionally narrowed to a survey and/or an author.
    pub async fn find_many(
        &self,
        survey_id: Option<i32>,
        author_id: Option<i32>,
    ) -> AppResult<Vec<survey_draft::Model>> {
        let mut query = SurveyDraft::find().order_by_desc(survey_draft::Column::LastSaved);

        if let Some(survey_id) = survey_id {
            query = query.filter(survey_draft::Column::SurveyId.eq(survey_id));
        }
        if let Some(author_id) = author_id {
            query = query.filter(survey_draft::Column::AuthorId.eq(author_id));
        }

        query
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new draft.
    pub async fn create(&self, model: survey_draft::ActiveModel) -> AppResult<survey_draft::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a draft.
    pub async fn update(&self, model: survey_draft::ActiveModel) -> AppResult<survey_draft::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a published draft together with every other draft of its survey.
    pub async fn delete_published_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        draft_id: i32,
        survey_id: i32,
    ) -> AppResult<u64> {
        let result = SurveyDraft::delete_many()
            .filter(
                Condition::any()
                    .add(survey_draft::Column::Id.eq(draft_id))
                    .add(survey_draft::Column::SurveyId.eq(survey_id)),
            )
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
