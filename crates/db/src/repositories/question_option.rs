//! Option repository.

use std::sync::Arc;

use crate::entities::{QuestionOption, question, question_option};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use survey_common::{AppError, AppResult};

/// Question option repository.
#[derive(Clone)]
pub struct OptionRepository {
    db: Arc<DatabaseConnection>,
}

impl OptionRepository {
    /// Create a new option repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an option by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<question_option::Model>> {
        QuestionOption::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an option by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<question_option::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Option not found: {id}")))
    }

    /// List the options of a question.
    pub async fn find_by_question(&self, question_id: i32) -> AppResult<Vec<question_option::Model>> {
        QuestionOption::find()
            .filter(question_option::Column::QuestionId.eq(question_id))
            .order_by_asc(question_option::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List the options of several questions.
    pub async fn find_by_questions(
        &self,
        question_ids: &[i32],
    ) -> AppResult<Vec<question_option::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        QuestionOption::find()
            .filter(question_option::Column::QuestionId.is_in(question_ids.iter().copied()))
            .order_by_asc(question_option::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new option.
    pub async fn create(
        &self,
        model: question_option::ActiveModel,
    ) -> AppResult<question_option::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert several options in one statement. Returns the number inserted.
    pub async fn create_many_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        models: Vec<question_option::ActiveModel>,
    ) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        QuestionOption::insert_many(models)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert several options and return the stored rows.
    pub async fn create_many_returning(
        &self,
        models: Vec<question_option::ActiveModel>,
    ) -> AppResult<Vec<question_option::Model>> {
        if models.is_empty() {
            return Ok(vec![]);
        }

        QuestionOption::insert_many(models)
            .exec_with_returning_many(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an option.
    pub async fn update(
        &self,
        model: question_option::ActiveModel,
    ) -> AppResult<question_option::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an option.
    pub async fn delete(&self, id: i32) -> AppResult<u64> {
        let result = QuestionOption::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Delete every option belonging to any question of a survey.
    pub async fn delete_by_survey_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        survey_id: i32,
    ) -> AppResult<u64> {
        let result = QuestionOption::delete_many()
            .filter(
                question_option::Column::QuestionId.in_subquery(
                    Query::select()
                        .column(question::Column::Id)
                        .from(question::Entity)
                        .and_where(question::Column::SurveyId.eq(survey_id))
                        .to_owned(),
                ),
            )
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
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_option(id: i32, question_id: i32, text: &str) -> question_option::Model {
        question_option::Model {
            id,
            question_id,
            option_text: text.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_questions_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = OptionRepository::new(db);
        let result = repo.find_by_questions(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_option(1, 5, "Yes"),
                    create_test_option(2, 5, "No"),
                ]])
                .into_connection(),
        );

        let repo = OptionRepository::new(db);
        let result = repo.find_by_question(5).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].option_text, "No");
    }

    #[tokio::test]
    async fn test_create_many_with_counts_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let now = Utc::now();
        let models = ["Red", "Blue"]
            .into_iter()
            .map(|text| question_option::ActiveModel {
                question_id: Set(5),
                option_text: Set(text.to_string()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .collect();

        let repo = OptionRepository::new(Arc::clone(&db));
        let inserted = repo.create_many_with(db.as_ref(), models).await.unwrap();

        assert_eq!(inserted, 2);
    }

    #[tokio::test]
    async fn test_delete_by_survey_uses_question_subquery() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = OptionRepository::new(Arc::clone(&db));
        let deleted = repo.delete_by_survey_with(db.as_ref(), 9).await.unwrap();
        assert_eq!(deleted, 3);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains(r#"DELETE FROM \"options\""#));
        assert!(sql.contains(r#"SELECT \"id\" FROM \"questions\""#));
    }
}
