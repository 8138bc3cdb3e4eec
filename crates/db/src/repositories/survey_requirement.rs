//! Survey requirement repository.

use std::sync::Arc;

use crate::entities::{SurveyRequirement, survey_requirement};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Survey requirement repository.
#[derive(Clone)]
pub struct SurveyRequirementRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyRequirementRepository {
    /// Create a new survey requirement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the requirements of a survey.
    pub async fn find_by_survey(&self, survey_id: i32) -> AppResult<Vec<survey_requirement::Model>> {
        SurveyRequirement::find()
            .filter(survey_requirement::Column::SurveyId.eq(survey_id))
            .order_by_asc(survey_requirement::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert several requirements at once. Returns the number inserted.
    pub async fn create_many_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<survey_requirement::ActiveModel>,
    ) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        SurveyRequirement::insert_many(models)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every requirement of a survey.
    pub async fn delete_by_survey_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey_id: i32,
    ) -> AppResult<u64> {
        let result = SurveyRequirement::delete_many()
            .filter(survey_requirement::Column::SurveyId.eq(survey_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
