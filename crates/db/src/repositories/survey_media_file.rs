//! Survey media file repository.

use std::sync::Arc;

use crate::entities::{SurveyMediaFile, survey_media_file};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Survey media file repository.
#[derive(Clone)]
pub struct SurveyMediaFileRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyMediaFileRepository {
    /// Create a new media file repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List the authored media of a survey (participant uploads excluded).
    pub async fn find_authored_by_survey(
        &self,
        survey_id: i32,
    ) -> AppResult<Vec<survey_media_file::Model>> {
        SurveyMediaFile::find()
            .filter(survey_media_file::Column::SurveyId.eq(survey_id))
            .filter(survey_media_file::Column::SessionId.is_null())
            .order_by_asc(survey_media_file::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the authored media of a survey.
    pub async fn count_authored_by_survey(&self, survey_id: i32) -> AppResult<u64> {
        SurveyMediaFile::find()
            .filter(survey_media_file::Column::SurveyId.eq(survey_id))
            .filter(survey_media_file::Column::SessionId.is_null())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert several media rows in one statement.
    pub async fn create_many_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<survey_media_file::ActiveModel>,
    ) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        SurveyMediaFile::insert_many(models)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the authored media of a survey, keeping participant uploads.
    pub async fn delete_authored_by_survey_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey_id: i32,
    ) -> AppResult<u64> {
        let result = SurveyMediaFile::delete_many()
            .filter(survey_media_file::Column::SurveyId.eq(survey_id))
            .filter(survey_media_file::Column::SessionId.is_null())
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
