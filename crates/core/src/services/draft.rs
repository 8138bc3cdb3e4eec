//! Survey draft service.
//!
//! A draft is the authoring client's working copy of a survey. Its content
//! refers to questions by ids the client made up; publishing turns it into
//! survey, question, option and media rows in one transaction, remapping
//! those ids to the ones the database assigns.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use survey_common::{AppError, AppResult};
use survey_db::entities::{
    question::{self, QuestionCategory, QuestionType},
    question_option,
    survey::{self, SurveyStatus},
    survey_draft,
    survey_media_file::{self, MediaFileType},
    survey_requirement,
};
use survey_db::repositories::{
    OptionRepository, QuestionRepository, SurveyDraftRepository, SurveyMediaFileRepository,
    SurveyRepository, SurveyRequirementRepository,
};
use tracing::{info, warn};

use super::access::Actor;
use super::question::{correct_answers_text, normalize_branching_logic};
use super::txn_err;

const MAX_TITLE_CHARS: usize = 200;

/// Input for creating a draft.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDraftInput {
    /// Survey the draft edits. `None` or 0 means a survey that does not exist yet.
    #[serde(default)]
    pub survey_id: Option<i32>,
    pub draft_content: JsonValue,
    #[serde(default)]
    pub last_edited_question: Option<i32>,
}

/// Input for updating a draft.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDraftInput {
    pub draft_content: Option<JsonValue>,
    pub last_edited_question: Option<i32>,
}

/// What a skipped item was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkippedKind {
    Option,
    MediaFile,
}

/// A draft item left out of a publish because its question was not found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub kind: SkippedKind,
    pub client_question_id: i32,
    pub reason: String,
}

/// Result of publishing a draft.
#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
    pub survey_id: i32,
    pub questions_created: u64,
    pub options_created: u64,
    pub media_created: u64,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftContent {
    basic_info: BasicInfo,
    #[serde(default)]
    questions: Vec<DraftQuestion>,
    #[serde(default)]
    options: Vec<DraftOption>,
    #[serde(default)]
    media_files: Vec<DraftMediaFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct BasicInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_self_recruitment: bool,
    #[serde(default)]
    requirements: Vec<DraftRequirement>,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftRequirement {
    skill_name: String,
    #[serde(default)]
    min_proficiency_level: i32,
    #[serde(default)]
    experience_level: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftQuestion {
    question_id: i32,
    question_text: String,
    question_type: QuestionType,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    branching_logic: Option<JsonValue>,
    #[serde(default)]
    correct_answers: Option<JsonValue>,
    #[serde(default)]
    category: Option<QuestionCategory>,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftOption {
    question_id: i32,
    option_text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DraftMediaFile {
    #[serde(default)]
    question_id: Option<i32>,
    file_url: String,
    file_type: MediaFileType,
}

/// An option whose question id now points at a stored question.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedOption {
    question_id: i32,
    option_text: String,
}

/// A media file whose question id, if any, points at a stored question.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedMedia {
    question_id: Option<i32>,
    file_url: String,
    file_type: MediaFileType,
}

/// Draft service.
#[derive(Clone)]
pub struct DraftService {
    db: Arc<DatabaseConnection>,
    survey_repo: SurveyRepository,
    draft_repo: SurveyDraftRepository,
    question_repo: QuestionRepository,
    option_repo: OptionRepository,
    media_repo: SurveyMediaFileRepository,
    requirement_repo: SurveyRequirementRepository,
}

impl DraftService {
    /// Create a new draft service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        survey_repo: SurveyRepository,
        draft_repo: SurveyDraftRepository,
        question_repo: QuestionRepository,
        option_repo: OptionRepository,
        media_repo: SurveyMediaFileRepository,
        requirement_repo: SurveyRequirementRepository,
    ) -> Self {
        Self {
            db,
            survey_repo,
            draft_repo,
            question_repo,
            option_repo,
            media_repo,
            requirement_repo,
        }
    }

    /// Save a new draft.
    pub async fn create_draft(
        &self,
        actor: Actor,
        input: CreateDraftInput,
    ) -> AppResult<survey_draft::Model> {
        ensure_object(&input.draft_content)?;

        let survey_id = input.survey_id.filter(|id| *id > 0);
        if let Some(survey_id) = survey_id {
            let survey = self.survey_repo.get_by_id(survey_id).await?;
            actor.ensure_can_manage(survey.conductor_id, "survey")?;
        }

        let now = Utc::now();
        let draft = self
            .draft_repo
            .create(survey_draft::ActiveModel {
                survey_id: Set(survey_id),
                author_id: Set(actor.user_id),
                draft_content: Set(input.draft_content),
                last_edited_question: Set(input.last_edited_question),
                last_saved: Set(now.into()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .await?;

        info!(draft_id = draft.id, author_id = actor.user_id, "Created survey draft");
        Ok(draft)
    }

    /// Get a draft.
    pub async fn get_draft(&self, actor: Actor, id: i32) -> AppResult<survey_draft::Model> {
        let draft = self.draft_repo.get_by_id(id).await?;
        actor.ensure_can_manage(draft.author_id, "draft")?;
        Ok(draft)
    }

    /// Replace a draft's content and/or last edited question.
    pub async fn update_draft(
        &self,
        actor: Actor,
        id: i32,
        input: UpdateDraftInput,
    ) -> AppResult<survey_draft::Model> {
        if let Some(content) = &input.draft_content {
            ensure_object(content)?;
        }

        let draft = self.draft_repo.get_by_id(id).await?;
        actor.ensure_can_manage(draft.author_id, "draft")?;

        let now = Utc::now();
        let mut active: survey_draft::ActiveModel = draft.into();
        if let Some(content) = input.draft_content {
            active.draft_content = Set(content);
        }
        if let Some(question_id) = input.last_edited_question {
            active.last_edited_question = Set(Some(question_id));
        }
        active.last_saved = Set(now.into());
        active.updated_at = Set(now.into());

        self.draft_repo.update(active).await
    }

    /// Most recently saved draft of a survey.
    pub async fn get_latest_draft(
        &self,
        actor: Actor,
        survey_id: i32,
    ) -> AppResult<survey_draft::Model> {
        let survey = self.survey_repo.get_by_id(survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        self.draft_repo
            .find_latest_by_survey(survey_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No draft for survey {survey_id}")))
    }

    /// List drafts. Admins see every draft, others only their own.
    pub async fn list_drafts(
        &self,
        actor: Actor,
        survey_id: Option<i32>,
    ) -> AppResult<Vec<survey_draft::Model>> {
        let author = (!actor.is_admin).then_some(actor.user_id);
        self.draft_repo.find_many(survey_id, author).await
    }

    /// Publish a draft into survey rows.
    ///
    /// Runs in one transaction. An existing survey has its questions,
    /// options, authored media and requirements replaced; otherwise a new
    /// survey owned by the actor is created. The draft and every other
    /// draft of the survey are deleted on success.
    pub async fn publish_draft(&self, actor: Actor, draft_id: i32) -> AppResult<PublishOutcome> {
        let draft = self.draft_repo.get_by_id(draft_id).await?;
        actor.ensure_can_manage(draft.author_id, "draft")?;
        parse_draft(&draft.draft_content)?;

        let txn = self.db.begin().await.map_err(txn_err)?;

        let Some(draft) = self.draft_repo.find_for_update_with(&txn, draft_id).await? else {
            return Err(AppError::Conflict("draft was already published".to_string()));
        };
        let content = parse_draft(&draft.draft_content)?;
        let info = content.basic_info;
        let now = Utc::now();

        let survey = match draft.survey_id {
            Some(survey_id) => {
                let existing = self
                    .survey_repo
                    .find_by_id_with(&txn, survey_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Survey not found: {survey_id}")))?;
                actor.ensure_can_manage(existing.conductor_id, "survey")?;

                let mut active: survey::ActiveModel = existing.into();
                active.title = Set(info.title.trim().to_string());
                active.description = Set(info.description);
                active.is_self_recruitment = Set(info.is_self_recruitment);
                active.status = Set(SurveyStatus::Published);
                active.updated_at = Set(now.into());
                let survey = self.survey_repo.update_with(&txn, active).await?;

                // Options reference questions, so they go first.
                self.option_repo.delete_by_survey_with(&txn, survey.id).await?;
                self.question_repo.delete_by_survey_with(&txn, survey.id).await?;
                self.media_repo
                    .delete_authored_by_survey_with(&txn, survey.id)
                    .await?;
                self.requirement_repo
                    .delete_by_survey_with(&txn, survey.id)
                    .await?;
                survey
            }
            None => {
                self.survey_repo
                    .create_with(
                        &txn,
                        survey::ActiveModel {
                            conductor_id: Set(actor.user_id),
                            title: Set(info.title.trim().to_string()),
                            description: Set(info.description),
                            is_self_recruitment: Set(info.is_self_recruitment),
                            status: Set(SurveyStatus::Published),
                            created_at: Set(now.into()),
                            updated_at: Set(now.into()),
                            ..Default::default()
                        },
                    )
                    .await?
            }
        };

        let mut id_map: HashMap<i32, i32> = HashMap::with_capacity(content.questions.len());
        for q in content.questions {
            let category = q
                .category
                .unwrap_or_else(|| QuestionCategory::infer_from_text(&q.question_text));
            let stored = self
                .question_repo
                .create_with(
                    &txn,
                    question::ActiveModel {
                        survey_id: Set(survey.id),
                        question_text: Set(q.question_text),
                        question_type: Set(q.question_type),
                        mandatory: Set(q.mandatory),
                        branching_logic: Set(draft_branching_logic(q.branching_logic.as_ref())?),
                        correct_answers: Set(draft_correct_answers(q.correct_answers.as_ref())),
                        category: Set(category),
                        created_at: Set(now.into()),
                        updated_at: Set(now.into()),
                        ..Default::default()
                    },
                )
                .await?;
            id_map.insert(q.question_id, stored.id);
        }
        let questions_created = id_map.len() as u64;

        let (options, mut skipped) = resolve_options(&content.options, &id_map);
        let option_models = options
            .into_iter()
            .map(|o| question_option::ActiveModel {
                question_id: Set(o.question_id),
                option_text: Set(o.option_text),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .collect::<Vec<_>>();
        let options_created = option_models.len() as u64;
        self.option_repo
            .create_many_with(&txn, option_models)
            .await?;

        let (media, media_skipped) = resolve_media(&content.media_files, &id_map);
        skipped.extend(media_skipped);
        let media_models = media
            .into_iter()
            .map(|m| survey_media_file::ActiveModel {
                survey_id: Set(survey.id),
                session_id: Set(None),
                question_id: Set(m.question_id),
                file_url: Set(m.file_url),
                file_type: Set(m.file_type),
                created_at: Set(now.into()),
                ..Default::default()
            })
            .collect::<Vec<_>>();
        let media_created = media_models.len() as u64;
        self.media_repo.create_many_with(&txn, media_models).await?;

        let requirements = info
            .requirements
            .into_iter()
            .map(|r| survey_requirement::ActiveModel {
                survey_id: Set(survey.id),
                skill_name: Set(r.skill_name),
                min_proficiency_level: Set(r.min_proficiency_level),
                experience_level: Set(r.experience_level),
                ..Default::default()
            })
            .collect();
        self.requirement_repo
            .create_many_with(&txn, requirements)
            .await?;

        self.draft_repo
            .delete_published_with(&txn, draft.id, survey.id)
            .await?;

        txn.commit().await.map_err(txn_err)?;

        info!(
            draft_id,
            survey_id = survey.id,
            questions = questions_created,
            options = options_created,
            media = media_created,
            skipped = skipped.len(),
            "Published survey draft"
        );

        Ok(PublishOutcome {
            survey_id: survey.id,
            questions_created,
            options_created,
            media_created,
            skipped,
        })
    }
}

fn ensure_object(content: &JsonValue) -> AppResult<()> {
    if content.is_object() {
        Ok(())
    } else {
        Err(AppError::Validation(
            "draft content must be a JSON object".to_string(),
        ))
    }
}

/// Parse draft content and check it can be published.
fn parse_draft(content: &JsonValue) -> AppResult<DraftContent> {
    let draft: DraftContent = serde_json::from_value(content.clone())
        .map_err(|e| AppError::MalformedDraft(e.to_string()))?;

    let title = draft.basic_info.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("survey title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "survey title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    if draft.questions.is_empty() {
        return Err(AppError::Validation(
            "cannot publish survey without questions".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(draft.questions.len());
    for q in &draft.questions {
        if !seen.insert(q.question_id) {
            return Err(AppError::Validation(format!(
                "duplicate question id {}",
                q.question_id
            )));
        }
        if q.question_text.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "question {} has no text",
                q.question_id
            )));
        }
        draft_branching_logic(q.branching_logic.as_ref())?;
    }

    Ok(draft)
}

/// Branching logic as stored. Null and blank strings mean none.
fn draft_branching_logic(value: Option<&JsonValue>) -> AppResult<Option<String>> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => normalize_branching_logic(v).map(Some),
    }
}

fn draft_correct_answers(value: Option<&JsonValue>) -> Option<String> {
    match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) if s.is_empty() => None,
        Some(v) => Some(correct_answers_text(v)),
    }
}

/// Point options at stored questions. Options whose client question id has
/// no stored question are skipped.
fn resolve_options(
    options: &[DraftOption],
    id_map: &HashMap<i32, i32>,
) -> (Vec<ResolvedOption>, Vec<SkippedItem>) {
    let mut resolved = Vec::with_capacity(options.len());
    let mut skipped = Vec::new();

    for option in options {
        if let Some(&question_id) = id_map.get(&option.question_id) {
            resolved.push(ResolvedOption {
                question_id,
                option_text: option.option_text.clone(),
            });
        } else {
            warn!(
                client_question_id = option.question_id,
                "Option references a question missing from the draft"
            );
            skipped.push(SkippedItem {
                kind: SkippedKind::Option,
                client_question_id: option.question_id,
                reason: "question not found in draft".to_string(),
            });
        }
    }

    (resolved, skipped)
}

/// Point media files at stored questions. Media without a question id
/// belong to the survey itself.
fn resolve_media(
    media: &[DraftMediaFile],
    id_map: &HashMap<i32, i32>,
) -> (Vec<ResolvedMedia>, Vec<SkippedItem>) {
    let mut resolved = Vec::with_capacity(media.len());
    let mut skipped = Vec::new();

    for file in media {
        let question_id = match file.question_id {
            None => None,
            Some(client_id) => {
                if let Some(&id) = id_map.get(&client_id) {
                    Some(id)
                } else {
                    warn!(
                        client_question_id = client_id,
                        "Media file references a question missing from the draft"
                    );
                    skipped.push(SkippedItem {
                        kind: SkippedKind::MediaFile,
                        client_question_id: client_id,
                        reason: "question not found in draft".to_string(),
                    });
                    continue;
                }
            }
        };
        resolved.push(ResolvedMedia {
            question_id,
            file_url: file.file_url.clone(),
            file_type: file.file_type,
        });
    }

    (resolved, skipped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_survey(id: i32, conductor_id: i32) -> survey::Model {
        survey::Model {
            id,
            conductor_id,
            title: "Old title".to_string(),
            description: "Old".to_string(),
            is_self_recruitment: false,
            status: SurveyStatus::Draft,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_draft(
        id: i32,
        survey_id: Option<i32>,
        content: JsonValue,
    ) -> survey_draft::Model {
        survey_draft::Model {
            id,
            survey_id,
            author_id: 3,
            draft_content: content,
            last_edited_question: None,
            last_saved: Utc::now().into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_question(id: i32, survey_id: i32, text: &str) -> question::Model {
        question::Model {
            id,
            survey_id,
            question_text: text.to_string(),
            question_type: QuestionType::SingleChoice,
            mandatory: false,
            branching_logic: None,
            correct_answers: None,
            category: QuestionCategory::General,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn two_question_draft() -> JsonValue {
        json!({
            "basicInfo": {"title": "Coffee", "description": "Habits"},
            "questions": [
                {"question_id": 1, "question_text": "Cups per day?", "question_type": "SINGLE_CHOICE"},
                {"question_id": 2, "question_text": "Favourite roast?", "question_type": "TEXT"}
            ],
            "options": [
                {"question_id": 1, "option_text": "One"},
                {"question_id": 1, "option_text": "Two"},
                {"question_id": 7, "option_text": "Orphan"}
            ],
            "mediaFiles": []
        })
    }

    fn service(db: Arc<DatabaseConnection>) -> DraftService {
        DraftService::new(
            Arc::clone(&db),
            SurveyRepository::new(Arc::clone(&db)),
            SurveyDraftRepository::new(Arc::clone(&db)),
            QuestionRepository::new(Arc::clone(&db)),
            OptionRepository::new(Arc::clone(&db)),
            SurveyMediaFileRepository::new(Arc::clone(&db)),
            SurveyRequirementRepository::new(Arc::clone(&db)),
        )
    }

    #[test]
    fn test_resolve_options_remaps_and_skips() {
        let id_map = HashMap::from([(1, 101), (2, 102)]);
        let options = vec![
            DraftOption {
                question_id: 1,
                option_text: "A".to_string(),
            },
            DraftOption {
                question_id: 2,
                option_text: "B".to_string(),
            },
            DraftOption {
                question_id: 3,
                option_text: "C".to_string(),
            },
        ];

        let (resolved, skipped) = resolve_options(&options, &id_map);

        assert_eq!(
            resolved,
            vec![
                ResolvedOption {
                    question_id: 101,
                    option_text: "A".to_string()
                },
                ResolvedOption {
                    question_id: 102,
                    option_text: "B".to_string()
                },
            ]
        );
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].kind, SkippedKind::Option);
        assert_eq!(skipped[0].client_question_id, 3);
    }

    #[test]
    fn test_resolve_media_keeps_survey_level_files() {
        let id_map = HashMap::from([(1, 101)]);
        let media = vec![
            DraftMediaFile {
                question_id: None,
                file_url: "http://m/cover.png".to_string(),
                file_type: MediaFileType::Image,
            },
            DraftMediaFile {
                question_id: Some(1),
                file_url: "http://m/clip.mp4".to_string(),
                file_type: MediaFileType::Video,
            },
            DraftMediaFile {
                question_id: Some(9),
                file_url: "http://m/lost.mp3".to_string(),
                file_type: MediaFileType::Audio,
            },
        ];

        let (resolved, skipped) = resolve_media(&media, &id_map);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].question_id, None);
        assert_eq!(resolved[1].question_id, Some(101));
        assert_eq!(skipped[0].kind, SkippedKind::MediaFile);
        assert_eq!(skipped[0].client_question_id, 9);
    }

    #[test]
    fn test_parse_draft_rejects_unknown_question_type() {
        let content = json!({
            "basicInfo": {"title": "T"},
            "questions": [{"question_id": 1, "question_text": "Q", "question_type": "ESSAY"}]
        });

        assert!(matches!(
            parse_draft(&content),
            Err(AppError::MalformedDraft(_))
        ));
    }

    #[test]
    fn test_parse_draft_rejects_missing_basic_info() {
        assert!(matches!(
            parse_draft(&json!({"questions": []})),
            Err(AppError::MalformedDraft(_))
        ));
    }

    #[test]
    fn test_parse_draft_requires_questions() {
        let result = parse_draft(&json!({"basicInfo": {"title": "T"}, "questions": []}));

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "cannot publish survey without questions");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_draft_rejects_duplicate_ids() {
        let content = json!({
            "basicInfo": {"title": "T"},
            "questions": [
                {"question_id": 1, "question_text": "A", "question_type": "TEXT"},
                {"question_id": 1, "question_text": "B", "question_type": "TEXT"}
            ]
        });

        assert!(matches!(parse_draft(&content), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_parse_draft_rejects_long_title() {
        let content = json!({
            "basicInfo": {"title": "x".repeat(201)},
            "questions": [{"question_id": 1, "question_text": "A", "question_type": "TEXT"}]
        });

        assert!(matches!(parse_draft(&content), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_draft_branching_logic_blank_is_none() {
        assert_eq!(draft_branching_logic(Some(&json!(""))).unwrap(), None);
        assert_eq!(draft_branching_logic(None).unwrap(), None);
        assert!(draft_branching_logic(Some(&json!({"condition": ""}))).is_err());
    }

    #[tokio::test]
    async fn test_create_draft_rejects_non_object() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .create_draft(
                Actor::new(3, false),
                CreateDraftInput {
                    survey_id: None,
                    draft_content: json!([1, 2]),
                    last_edited_question: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_drafts_for_admin_is_unfiltered() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_draft(1, None, json!({})),
                    create_test_draft(2, Some(4), json!({})),
                ]])
                .into_connection(),
        );

        let drafts = service(Arc::clone(&db))
            .list_drafts(Actor::new(99, true), None)
            .await
            .unwrap();
        assert_eq!(drafts.len(), 2);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains(r#"\"author_id\" ="#));
    }

    #[tokio::test]
    async fn test_publish_new_survey_remaps_option_ids() {
        let draft = create_test_draft(5, None, two_question_draft());
        let mut created = create_test_survey(40, 3);
        created.status = SurveyStatus::Published;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft.clone()]])
                .append_query_results([[draft]])
                .append_query_results([[created]])
                .append_query_results([[create_test_question(101, 40, "Cups per day?")]])
                .append_query_results([[create_test_question(102, 40, "Favourite roast?")]])
                .append_exec_results([exec(2), exec(1)])
                .into_connection(),
        );

        let outcome = service(Arc::clone(&db))
            .publish_draft(Actor::new(3, false), 5)
            .await
            .unwrap();

        assert_eq!(outcome.survey_id, 40);
        assert_eq!(outcome.questions_created, 2);
        assert_eq!(outcome.options_created, 2);
        assert_eq!(outcome.media_created, 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].client_question_id, 7);

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains(r#"DELETE FROM \"options\""#));
        assert!(log.contains(r#"INSERT INTO \"options\""#));
        // Both options point at the id stored for client question 1.
        let options_insert = &log[log.find(r#"INSERT INTO \"options\""#).unwrap()..];
        assert!(options_insert.contains("Int(Some(101))"));
        assert!(!options_insert[..options_insert.find("DELETE").unwrap()].contains("Int(Some(102))"));
    }

    #[tokio::test]
    async fn test_republish_replaces_previous_rows() {
        let content = two_question_draft();
        let draft = create_test_draft(5, Some(40), content);
        let survey = create_test_survey(40, 3);
        let mut published = survey.clone();
        published.status = SurveyStatus::Published;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft.clone()]])
                .append_query_results([[draft]])
                .append_query_results([[survey]])
                .append_query_results([[published]])
                .append_query_results([[create_test_question(101, 40, "Cups per day?")]])
                .append_query_results([[create_test_question(102, 40, "Favourite roast?")]])
                .append_exec_results([exec(3), exec(2), exec(0), exec(0), exec(2), exec(1)])
                .into_connection(),
        );

        service(Arc::clone(&db))
            .publish_draft(Actor::new(3, false), 5)
            .await
            .unwrap();

        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        let delete_options = log.find(r#"DELETE FROM \"options\""#).unwrap();
        let delete_questions = log.find(r#"DELETE FROM \"questions\""#).unwrap();
        let delete_media = log.find(r#"DELETE FROM \"survey_media_files\""#).unwrap();
        let insert_question = log.find(r#"INSERT INTO \"questions\""#).unwrap();
        assert!(delete_options < delete_questions);
        assert!(delete_questions < delete_media);
        assert!(delete_media < insert_question);
    }

    #[tokio::test]
    async fn test_publish_by_other_user_forbidden() {
        let draft = create_test_draft(5, None, two_question_draft());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );

        let result = service(db).publish_draft(Actor::new(8, false), 5).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_publish_malformed_draft_writes_nothing() {
        let draft = create_test_draft(5, None, json!({"basicInfo": "oops"}));
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .into_connection(),
        );

        let result = service(Arc::clone(&db))
            .publish_draft(Actor::new(3, false), 5)
            .await;

        assert!(matches!(result, Err(AppError::MalformedDraft(_))));
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_publish_already_published_conflicts() {
        let draft = create_test_draft(5, None, two_question_draft());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft]])
                .append_query_results([Vec::<survey_draft::Model>::new()])
                .into_connection(),
        );

        let result = service(db).publish_draft(Actor::new(3, false), 5).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_publish_rolls_back_when_option_insert_fails() {
        let draft = create_test_draft(5, None, two_question_draft());
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[draft.clone()]])
                .append_query_results([[draft]])
                .append_query_results([[create_test_survey(40, 3)]])
                .append_query_results([[create_test_question(101, 40, "Cups per day?")]])
                .append_query_results([[create_test_question(102, 40, "Favourite roast?")]])
                .append_exec_errors([sea_orm::DbErr::Custom("insert failed".to_string())])
                .into_connection(),
        );

        let result = service(Arc::clone(&db))
            .publish_draft(Actor::new(3, false), 5)
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains("COMMIT"));
    }
}
