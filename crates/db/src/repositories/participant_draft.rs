//! Participant draft repository.

use std::sync::Arc;

use crate::entities::{ParticipantSurveyDraft, participant_survey_draft};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde_json::Value as JsonValue;
use survey_common::{AppError, AppResult};

/// Repository for in-progress participant answers.
#[derive(Clone)]
pub struct ParticipantDraftRepository {
    db: Arc<DatabaseConnection>,
}

impl ParticipantDraftRepository {
    /// Create a new participant draft repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the draft of a session.
    pub async fn find_by_session(
        &self,
        session_id: i32,
    ) -> AppResult<Option<participant_survey_draft::Model>> {
        ParticipantSurveyDraft::find()
            .filter(participant_survey_draft::Column::SessionId.eq(session_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert or replace the draft of a session.
    ///
    /// Keyed on `session_id`, so repeated saves converge on one row.
    pub async fn upsert(
        &self,
        session_id: i32,
        last_answered_question_id: Option<i32>,
        content: JsonValue,
    ) -> AppResult<participant_survey_draft::Model> {
        let now = Utc::now();
        let model = participant_survey_draft::ActiveModel {
            session_id: Set(session_id),
            last_answered_question_id: Set(last_answered_question_id),
            draft_answers_content: Set(content),
            last_saved: Set(now.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        ParticipantSurveyDraft::insert(model)
            .on_conflict(
                OnConflict::column(participant_survey_draft::Column::SessionId)
                    .update_columns([
                        participant_survey_draft::Column::LastAnsweredQuestionId,
                        participant_survey_draft::Column::DraftAnswersContent,
                        participant_survey_draft::Column::LastSaved,
                        participant_survey_draft::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the draft of a session.
    pub async fn delete_by_session_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        session_id: i32,
    ) -> AppResult<u64> {
        let result = ParticipantSurveyDraft::delete_many()
            .filter(participant_survey_draft::Column::SessionId.eq(session_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn create_test_draft(session_id: i32, content: JsonValue) -> participant_survey_draft::Model {
        participant_survey_draft::Model {
            id: 1,
            session_id,
            last_answered_question_id: Some(2),
            draft_answers_content: content,
            last_saved: Utc::now().into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_upsert_uses_on_conflict() {
        let content = json!({"1": "yes", "2": 4});
        let stored = create_test_draft(8, content.clone());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored.clone()]])
                .into_connection(),
        );

        let repo = ParticipantDraftRepository::new(Arc::clone(&db));
        let result = repo.upsert(8, Some(2), content.clone()).await.unwrap();
        assert_eq!(result.draft_answers_content, content);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains(r#"ON CONFLICT (\"session_id\") DO UPDATE"#));
    }

    #[tokio::test]
    async fn test_find_by_session_missing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<participant_survey_draft::Model>::new()])
                .into_connection(),
        );

        let repo = ParticipantDraftRepository::new(db);
        assert!(repo.find_by_session(8).await.unwrap().is_none());
    }
}
