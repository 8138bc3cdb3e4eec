//! Answer service for the management side.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use survey_common::{AppError, AppResult};
use survey_db::entities::answer;
use survey_db::repositories::{AnswerRepository, SurveySessionRepository};
use tracing::info;
use validator::Validate;

use super::txn_err;

/// Input for storing one answer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAnswerInput {
    #[validate(range(min = 1))]
    pub session_id: i32,
    #[validate(range(min = 1))]
    pub question_id: i32,
    /// Response as JSON text.
    pub response: String,
}

/// Input for storing several answers at once.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkAnswersInput {
    #[validate(length(min = 1), nested)]
    pub answers: Vec<CreateAnswerInput>,
}

/// Answer service.
#[derive(Clone)]
pub struct AnswerService {
    db: Arc<DatabaseConnection>,
    session_repo: SurveySessionRepository,
    answer_repo: AnswerRepository,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        session_repo: SurveySessionRepository,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            db,
            session_repo,
            answer_repo,
        }
    }

    /// Store a single answer.
    pub async fn create_answer(&self, input: CreateAnswerInput) -> AppResult<answer::Model> {
        input.validate()?;
        let response = canonical_response(&input.response)?;

        if self.session_repo.find_by_id(input.session_id).await?.is_none() {
            return Err(AppError::SessionNotFound(input.session_id));
        }

        let now = Utc::now();
        self.answer_repo
            .create(answer::ActiveModel {
                session_id: Set(input.session_id),
                question_id: Set(input.question_id),
                response: Set(response),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await
    }

    /// Store a batch of answers in one transaction. Returns the number stored.
    pub async fn submit_bulk_answers(&self, input: BulkAnswersInput) -> AppResult<u64> {
        input.validate()?;

        let now = Utc::now();
        let mut models = Vec::with_capacity(input.answers.len());
        for item in input.answers {
            models.push(answer::ActiveModel {
                session_id: Set(item.session_id),
                question_id: Set(item.question_id),
                response: Set(canonical_response(&item.response)?),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            });
        }

        let txn = self.db.begin().await.map_err(txn_err)?;
        let saved = self.answer_repo.create_many_with(&txn, models).await?;
        txn.commit().await.map_err(txn_err)?;

        info!(count = saved, "Stored answers in bulk");
        Ok(saved)
    }

    /// List the answers of a session.
    pub async fn list_by_session(&self, session_id: i32) -> AppResult<Vec<answer::Model>> {
        self.answer_repo.find_by_session(session_id).await
    }

    /// List the answers given to a question.
    pub async fn list_by_question(&self, question_id: i32) -> AppResult<Vec<answer::Model>> {
        self.answer_repo.find_by_question(question_id).await
    }
}

/// Parse a response and re-encode it as compact JSON.
fn canonical_response(raw: &str) -> AppResult<String> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Validation(format!("response must be valid JSON: {e}")))?;
    serde_json::to_string(&value).map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use survey_db::entities::survey_session::{self, SessionStatus};

    fn service(db: MockDatabase) -> AnswerService {
        let db = Arc::new(db.into_connection());
        AnswerService::new(
            Arc::clone(&db),
            SurveySessionRepository::new(Arc::clone(&db)),
            AnswerRepository::new(Arc::clone(&db)),
        )
    }

    fn input(session_id: i32, question_id: i32, response: &str) -> CreateAnswerInput {
        CreateAnswerInput {
            session_id,
            question_id,
            response: response.to_string(),
        }
    }

    #[test]
    fn test_canonical_response_compacts() {
        assert_eq!(
            canonical_response(r#"{ "a" : [1, 2] }"#).unwrap(),
            r#"{"a":[1,2]}"#
        );
        assert_eq!(canonical_response(r#""Yes""#).unwrap(), r#""Yes""#);
        assert!(canonical_response("not json").is_err());
    }

    #[tokio::test]
    async fn test_create_answer_rejects_invalid_json() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .create_answer(input(1, 2, "{oops"))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_answer_unknown_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<survey_session::Model>::new()]);

        let result = service(db).create_answer(input(7, 2, "5")).await;

        assert!(matches!(result, Err(AppError::SessionNotFound(7))));
    }

    #[tokio::test]
    async fn test_create_answer_success() {
        let now = Utc::now();
        let session = survey_session::Model {
            id: 7,
            survey_id: 1,
            participant_id: 3,
            last_question_id: None,
            session_status: SessionStatus::InProgress,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let stored = answer::Model {
            id: 1,
            session_id: 7,
            question_id: 2,
            response: "5".to_string(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session]])
            .append_query_results([[stored]]);

        let saved = service(db).create_answer(input(7, 2, " 5 ")).await.unwrap();

        assert_eq!(saved.response, "5");
    }

    #[tokio::test]
    async fn test_bulk_rejects_empty() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .submit_bulk_answers(BulkAnswersInput { answers: vec![] })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bulk_inserts_in_one_statement() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
        ]);

        let saved = service(db)
            .submit_bulk_answers(BulkAnswersInput {
                answers: vec![input(1, 1, r#""A""#), input(1, 2, "[1,2]")],
            })
            .await
            .unwrap();

        assert_eq!(saved, 2);
    }
}
