//! Answer repository.

use std::sync::Arc;

use crate::entities::{Answer, answer};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Answer repository.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a single answer.
    pub async fn create(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert answers in one statement. Returns the number inserted.
    pub async fn create_many_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<answer::ActiveModel>,
    ) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        Answer::insert_many(models)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the answers of a session.
    pub async fn find_by_session(&self, session_id: i32) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::SessionId.eq(session_id))
            .order_by_asc(answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the answers given to a question.
    pub async fn find_by_question(&self, question_id: i32) -> AppResult<Vec<answer::Model>> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .order_by_asc(answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the answers of several sessions.
    pub async fn find_by_sessions(&self, session_ids: &[i32]) -> AppResult<Vec<answer::Model>> {
        if session_ids.is_empty() {
            return Ok(vec![]);
        }

        Answer::find()
            .filter(answer::Column::SessionId.is_in(session_ids.iter().copied()))
            .order_by_asc(answer::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    #[tokio::test]
    async fn test_create_many_with_empty_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = AnswerRepository::new(Arc::clone(&db));
        assert_eq!(repo.create_many_with(db.as_ref(), vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_many_with() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let now = Utc::now();
        let models = vec![
            answer::ActiveModel {
                session_id: Set(3),
                question_id: Set(10),
                response: Set("\"yes\"".to_string()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            },
            answer::ActiveModel {
                session_id: Set(3),
                question_id: Set(11),
                response: Set("4".to_string()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            },
        ];

        let repo = AnswerRepository::new(Arc::clone(&db));
        assert_eq!(repo.create_many_with(db.as_ref(), models).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_question() {
        let now = Utc::now();
        let answer = answer::Model {
            id: 1,
            session_id: 3,
            question_id: 10,
            response: "\"Blue\"".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[answer.clone()]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        assert_eq!(repo.find_by_question(10).await.unwrap(), vec![answer]);
    }
}
