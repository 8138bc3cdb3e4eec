//! Survey repository.

use std::sync::Arc;

use crate::entities::{Survey, survey};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use survey_common::{AppError, AppResult};

/// Survey repository for database operations.
#[derive(Clone)]
pub struct SurveyRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveyRepository {
    /// Create a new survey repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a survey by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<survey::Model>> {
        self.find_by_id_with(self.db.as_ref(), id).await
    }

    /// Find a survey by ID on the given connection.
    pub async fn find_by_id_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> AppResult<Option<survey::Model>> {
        Survey::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a survey by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<survey::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Survey not found: {id}")))
    }

    /// Create a new survey.
    pub async fn create(&self, model: survey::ActiveModel) -> AppResult<survey::Model> {
        self.create_with(self.db.as_ref(), model).await
    }

    /// Create a new survey on the given connection.
    pub async fn create_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey::ActiveModel,
    ) -> AppResult<survey::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a survey.
    pub async fn update(&self, model: survey::ActiveModel) -> AppResult<survey::Model> {
        self.update_with(self.db.as_ref(), model).await
    }

    /// Update a survey on the given connection.
    pub async fn update_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        model: survey::ActiveModel,
    ) -> AppResult<survey::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the publication status of a survey.
    pub async fn set_status(
        &self,
        survey: survey::Model,
        status: survey::SurveyStatus,
    ) -> AppResult<survey::Model> {
        let mut active: survey::ActiveModel = survey.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        self.update(active).await
    }

    /// Delete a survey. Dependent rows go with it through cascading keys.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if let Some(survey) = self.find_by_id(id).await? {
            survey
                .delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// List surveys authored by a conductor, newest first.
    pub async fn find_by_conductor(
        &self,
        conductor_id: i32,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<survey::Model>> {
        Survey::find()
            .filter(survey::Column::ConductorId.eq(conductor_id))
            .order_by_desc(survey::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all surveys, newest first.
    pub async fn find_all(&self, limit: u64, offset: u64) -> AppResult<Vec<survey::Model>> {
        Survey::find()
            .order_by_desc(survey::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count surveys authored by a conductor.
    pub async fn count_by_conductor(&self, conductor_id: i32) -> AppResult<u64> {
        Survey::find()
            .filter(survey::Column::ConductorId.eq(conductor_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_survey(id: i32, conductor_id: i32) -> survey::Model {
        survey::Model {
            id,
            conductor_id,
            title: "Commute habits".to_string(),
            description: "How do you get to work?".to_string(),
            is_self_recruitment: false,
            status: survey::SurveyStatus::Draft,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let survey = create_test_survey(7, 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[survey.clone()]])
                .into_connection(),
        );

        let repo = SurveyRepository::new(db);
        let result = repo.find_by_id(7).await.unwrap();

        assert_eq!(result, Some(survey));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<survey::Model>::new()])
                .into_connection(),
        );

        let repo = SurveyRepository::new(db);
        let result = repo.get_by_id(99).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_status_published() {
        let survey = create_test_survey(7, 3);
        let mut published = survey.clone();
        published.status = survey::SurveyStatus::Published;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[published.clone()]])
                .into_connection(),
        );

        let repo = SurveyRepository::new(db);
        let result = repo
            .set_status(survey, survey::SurveyStatus::Published)
            .await
            .unwrap();

        assert_eq!(result.status, survey::SurveyStatus::Published);
    }

    #[tokio::test]
    async fn test_find_by_conductor() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_survey(2, 3), create_test_survey(1, 3)]])
                .into_connection(),
        );

        let repo = SurveyRepository::new(db);
        let result = repo.find_by_conductor(3, 10, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|s| s.conductor_id == 3));
    }
}
