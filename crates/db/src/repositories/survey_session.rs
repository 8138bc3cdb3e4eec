//! Survey session repository.

use std::sync::Arc;

use super::map_unique_violation;
use crate::entities::{SurveySession, survey_session};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use survey_common::{AppError, AppResult};

use survey_session::SessionStatus;

/// Survey session repository.
#[derive(Clone)]
pub struct SurveySessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SurveySessionRepository {
    /// Create a new survey session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<survey_session::Model>> {
        SurveySession::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the in-progress session of a participant for a survey.
    pub async fn find_in_progress(
        &self,
        survey_id: i32,
        participant_id: i32,
    ) -> AppResult<Option<survey_session::Model>> {
        SurveySession::find()
            .filter(survey_session::Column::SurveyId.eq(survey_id))
            .filter(survey_session::Column::ParticipantId.eq(participant_id))
            .filter(survey_session::Column::SessionStatus.eq(SessionStatus::InProgress))
            .order_by_desc(survey_session::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Start a new in-progress session.
    ///
    /// Returns `Conflict` when the participant already has one for the survey.
    pub async fn create_in_progress(
        &self,
        survey_id: i32,
        participant_id: i32,
    ) -> AppResult<survey_session::Model> {
        let now = Utc::now();
        let model = survey_session::ActiveModel {
            survey_id: Set(survey_id),
            participant_id: Set(participant_id),
            last_question_id: Set(None),
            session_status: Set(SessionStatus::InProgress),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, "an in-progress session already exists"))
    }

    /// Record the last question a participant reached.
    pub async fn set_last_question(&self, id: i32, question_id: i32) -> AppResult<()> {
        SurveySession::update_many()
            .col_expr(survey_session::Column::LastQuestionId, Expr::value(question_id))
            .col_expr(survey_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(survey_session::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Flip an in-progress session to completed.
    ///
    /// The status check is part of the `UPDATE`, so of two racing submissions
    /// only one sees a row affected. Returns the number of rows changed.
    pub async fn complete_with<C: ConnectionTrait>(&self, conn: &C, id: i32) -> AppResult<u64> {
        let result = SurveySession::update_many()
            .col_expr(
                survey_session::Column::SessionStatus,
                Expr::value(SessionStatus::Completed.as_str()),
            )
            .col_expr(survey_session::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(survey_session::Column::Id.eq(id))
            .filter(survey_session::Column::SessionStatus.eq(SessionStatus::InProgress))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// List completed sessions of a survey.
    pub async fn find_completed_by_survey(
        &self,
        survey_id: i32,
    ) -> AppResult<Vec<survey_session::Model>> {
        SurveySession::find()
            .filter(survey_session::Column::SurveyId.eq(survey_id))
            .filter(survey_session::Column::SessionStatus.eq(SessionStatus::Completed))
            .order_by_asc(survey_session::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_session(id: i32, status: SessionStatus) -> survey_session::Model {
        survey_session::Model {
            id,
            survey_id: 1,
            participant_id: 42,
            last_question_id: None,
            session_status: status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_in_progress() {
        let session = create_test_session(3, SessionStatus::InProgress);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session.clone()]])
                .into_connection(),
        );

        let repo = SurveySessionRepository::new(db);
        let result = repo.find_in_progress(1, 42).await.unwrap();

        assert_eq!(result, Some(session));
    }

    #[tokio::test]
    async fn test_create_in_progress() {
        let session = create_test_session(3, SessionStatus::InProgress);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session.clone()]])
                .into_connection(),
        );

        let repo = SurveySessionRepository::new(db);
        let created = repo.create_in_progress(1, 42).await.unwrap();

        assert_eq!(created.session_status, SessionStatus::InProgress);
        assert!(created.last_question_id.is_none());
    }

    #[tokio::test]
    async fn test_complete_with_no_rows_when_already_completed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = SurveySessionRepository::new(Arc::clone(&db));
        let changed = repo.complete_with(db.as_ref(), 3).await.unwrap();
        assert_eq!(changed, 0);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains(r#"UPDATE \"survey_sessions\""#));
        assert!(sql.contains(r#"\"session_status\" = $"#));
    }
}
