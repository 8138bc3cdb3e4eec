//! Question service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use survey_common::{AppError, AppResult};
use survey_db::entities::question::{self, QuestionCategory, QuestionType};
use survey_db::entities::question_option;
use survey_db::repositories::{OptionRepository, QuestionRepository, SurveyRepository};
use validator::Validate;

use super::access::Actor;
use super::txn_err;

/// A question with its answer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: question::Model,
    pub options: Vec<question_option::Model>,
}

/// Input for creating a question.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionInput {
    pub survey_id: i32,
    #[validate(length(min = 1, max = 4096))]
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub branching_logic: Option<JsonValue>,
    #[serde(default)]
    pub correct_answers: Option<JsonValue>,
    /// Inferred from the question text when absent.
    #[serde(default)]
    pub category: Option<QuestionCategory>,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Input for updating a question.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestionInput {
    #[validate(length(min = 1, max = 4096))]
    pub question_text: Option<String>,
    pub question_type: Option<QuestionType>,
    pub mandatory: Option<bool>,
    #[serde(default, with = "double_option")]
    pub branching_logic: Option<Option<JsonValue>>,
    #[serde(default, with = "double_option")]
    pub correct_answers: Option<Option<JsonValue>>,
    pub category: Option<QuestionCategory>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// Question service.
#[derive(Clone)]
pub struct QuestionService {
    db: Arc<DatabaseConnection>,
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    option_repo: OptionRepository,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        option_repo: OptionRepository,
    ) -> Self {
        Self {
            db,
            survey_repo,
            question_repo,
            option_repo,
        }
    }

    /// Create a question, with its options, on a survey the actor owns.
    pub async fn create_question(
        &self,
        actor: Actor,
        input: CreateQuestionInput,
    ) -> AppResult<QuestionWithOptions> {
        input.validate()?;

        if input.question_type.requires_options() && input.options.is_empty() {
            return Err(AppError::Validation(
                "choice questions need at least one option".to_string(),
            ));
        }
        if input.options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::Validation("option text cannot be empty".to_string()));
        }

        let survey = self.survey_repo.get_by_id(input.survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        let branching_logic = input
            .branching_logic
            .as_ref()
            .map(normalize_branching_logic)
            .transpose()?;
        let category = input
            .category
            .unwrap_or_else(|| QuestionCategory::infer_from_text(&input.question_text));

        let now = Utc::now();
        let model = question::ActiveModel {
            survey_id: Set(survey.id),
            question_text: Set(input.question_text),
            question_type: Set(input.question_type),
            mandatory: Set(input.mandatory),
            branching_logic: Set(branching_logic),
            correct_answers: Set(input.correct_answers.as_ref().map(correct_answers_text)),
            category: Set(category),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let txn = self.db.begin().await.map_err(txn_err)?;

        let question = self.question_repo.create_with(&txn, model).await?;
        let options = input
            .options
            .into_iter()
            .map(|text| question_option::ActiveModel {
                question_id: Set(question.id),
                option_text: Set(text),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .collect();
        self.option_repo.create_many_with(&txn, options).await?;

        txn.commit().await.map_err(txn_err)?;

        let options = self.option_repo.find_by_question(question.id).await?;
        Ok(QuestionWithOptions { question, options })
    }

    /// Get a question with its options.
    pub async fn get_question(&self, id: i32) -> AppResult<QuestionWithOptions> {
        let question = self.question_repo.get_by_id(id).await?;
        let options = self.option_repo.find_by_question(id).await?;
        Ok(QuestionWithOptions { question, options })
    }

    /// List the questions of a survey, each with its options.
    pub async fn list_by_survey(&self, survey_id: i32) -> AppResult<Vec<QuestionWithOptions>> {
        let questions = self.question_repo.find_by_survey(survey_id).await?;
        let ids: Vec<i32> = questions.iter().map(|q| q.id).collect();
        let options = self.option_repo.find_by_questions(&ids).await?;

        Ok(attach_options(questions, options))
    }

    /// Update a question.
    pub async fn update_question(
        &self,
        actor: Actor,
        id: i32,
        input: UpdateQuestionInput,
    ) -> AppResult<question::Model> {
        input.validate()?;

        let question = self.question_repo.get_by_id(id).await?;
        let survey = self.survey_repo.get_by_id(question.survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        let mut active: question::ActiveModel = question.into();

        if let Some(text) = input.question_text {
            active.question_text = Set(text);
        }
        if let Some(question_type) = input.question_type {
            active.question_type = Set(question_type);
        }
        if let Some(mandatory) = input.mandatory {
            active.mandatory = Set(mandatory);
        }
        if let Some(logic) = input.branching_logic {
            active.branching_logic = Set(logic.as_ref().map(normalize_branching_logic).transpose()?);
        }
        if let Some(answers) = input.correct_answers {
            active.correct_answers = Set(answers.as_ref().map(correct_answers_text));
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        active.updated_at = Set(Utc::now().into());

        self.question_repo.update(active).await
    }

    /// Delete a question and its options.
    pub async fn delete_question(&self, actor: Actor, id: i32) -> AppResult<()> {
        let question = self.question_repo.get_by_id(id).await?;
        let survey = self.survey_repo.get_by_id(question.survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        self.question_repo.delete(id).await?;
        Ok(())
    }
}

/// Group options under their questions, keeping question order.
pub(crate) fn attach_options(
    questions: Vec<question::Model>,
    options: Vec<question_option::Model>,
) -> Vec<QuestionWithOptions> {
    let mut by_question: HashMap<i32, Vec<question_option::Model>> = HashMap::new();
    for option in options {
        by_question.entry(option.question_id).or_default().push(option);
    }

    questions
        .into_iter()
        .map(|question| {
            let options = by_question.remove(&question.id).unwrap_or_default();
            QuestionWithOptions { question, options }
        })
        .collect()
}

/// Validate branching logic and return it as stored JSON text.
///
/// Accepts an object or a string holding one. The object needs a non-empty
/// `condition` and a non-zero `next_question`.
pub(crate) fn normalize_branching_logic(value: &JsonValue) -> AppResult<String> {
    let parsed;
    let object = match value {
        JsonValue::String(text) => {
            parsed = serde_json::from_str::<JsonValue>(text).map_err(|e| {
                AppError::Validation(format!("branching logic is not valid JSON: {e}"))
            })?;
            &parsed
        }
        other => other,
    };

    let map = object
        .as_object()
        .ok_or_else(|| AppError::Validation("branching logic must be an object".to_string()))?;

    let condition_ok = match map.get("condition") {
        Some(JsonValue::String(s)) => !s.trim().is_empty(),
        Some(JsonValue::Null) | None => false,
        Some(_) => true,
    };
    if !condition_ok {
        return Err(AppError::Validation(
            "branching logic needs a condition".to_string(),
        ));
    }

    let next_ok = map
        .get("next_question")
        .and_then(JsonValue::as_i64)
        .is_some_and(|n| n != 0);
    if !next_ok {
        return Err(AppError::Validation(
            "branching logic needs a non-zero next_question".to_string(),
        ));
    }

    Ok(object.to_string())
}

/// Stored form of `correct_answers`: strings verbatim, anything else as JSON.
pub(crate) fn correct_answers_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;
    use survey_db::entities::survey;

    fn create_test_question(id: i32, text: &str) -> question::Model {
        question::Model {
            id,
            survey_id: 1,
            question_text: text.to_string(),
            question_type: QuestionType::SingleChoice,
            mandatory: true,
            branching_logic: None,
            correct_answers: None,
            category: QuestionCategory::General,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_option(id: i32, question_id: i32) -> question_option::Model {
        question_option::Model {
            id,
            question_id,
            option_text: format!("option {id}"),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_survey(conductor_id: i32) -> survey::Model {
        survey::Model {
            id: 1,
            conductor_id,
            title: "T".to_string(),
            description: String::new(),
            is_self_recruitment: false,
            status: survey::SurveyStatus::Draft,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> QuestionService {
        let db = Arc::new(db.into_connection());
        QuestionService::new(
            Arc::clone(&db),
            SurveyRepository::new(Arc::clone(&db)),
            QuestionRepository::new(Arc::clone(&db)),
            OptionRepository::new(Arc::clone(&db)),
        )
    }

    #[test]
    fn test_normalize_branching_logic_accepts_object_and_string() {
        let obj = json!({"condition": "answer == 'Yes'", "next_question": 4});
        assert!(normalize_branching_logic(&obj).is_ok());

        let text = JsonValue::String(obj.to_string());
        let stored = normalize_branching_logic(&text).unwrap();
        let decoded: JsonValue = serde_json::from_str(&stored).unwrap();
        assert_eq!(decoded, obj);
    }

    #[test]
    fn test_normalize_branching_logic_rejects_invalid() {
        for bad in [
            json!("not json"),
            json!([1, 2]),
            json!({"condition": "", "next_question": 2}),
            json!({"condition": "x"}),
            json!({"condition": "x", "next_question": 0}),
        ] {
            assert!(
                matches!(normalize_branching_logic(&bad), Err(AppError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_attach_options_keeps_question_order() {
        let grouped = attach_options(
            vec![create_test_question(2, "b"), create_test_question(1, "a")],
            vec![create_test_option(10, 1), create_test_option(11, 2), create_test_option(12, 1)],
        );

        assert_eq!(grouped[0].question.id, 2);
        assert_eq!(grouped[0].options.len(), 1);
        assert_eq!(grouped[1].options.len(), 2);
    }

    #[tokio::test]
    async fn test_create_choice_question_requires_options() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .create_question(
                Actor::new(1, false),
                CreateQuestionInput {
                    survey_id: 1,
                    question_text: "Pick one".to_string(),
                    question_type: QuestionType::SingleChoice,
                    mandatory: false,
                    branching_logic: None,
                    correct_answers: None,
                    category: None,
                    options: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_question_on_foreign_survey_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_survey(7)]]);

        let result = service(db)
            .create_question(
                Actor::new(1, false),
                CreateQuestionInput {
                    survey_id: 1,
                    question_text: "Why?".to_string(),
                    question_type: QuestionType::Text,
                    mandatory: false,
                    branching_logic: None,
                    correct_answers: None,
                    category: None,
                    options: vec![],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_get_question_with_options() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_question(5, "Colour?")]])
            .append_query_results([[create_test_option(1, 5), create_test_option(2, 5)]]);

        let result = service(db).get_question(5).await.unwrap();

        assert_eq!(result.question.question_text, "Colour?");
        assert_eq!(result.options.len(), 2);
    }
}
