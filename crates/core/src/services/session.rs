//! Participant session service.
//!
//! Tracks one participant's attempt at a published survey: starting or
//! resuming the session, autosaving a draft of the answers, and the final
//! submission, which writes the answers and closes the session atomically.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use survey_common::{AnswerEncodingPolicy, AppError, AppResult};
use survey_db::entities::{
    answer, participant_survey_draft, survey,
    survey_session::{self, SessionStatus},
};
use survey_db::repositories::{
    AnswerRepository, ParticipantDraftRepository, QuestionRepository, SurveyRepository,
    SurveySessionRepository,
};
use tracing::{info, warn};

use super::txn_err;

/// Survey metadata returned with a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyOverview {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: survey::SurveyStatus,
    pub question_count: u64,
}

/// A session together with its saved draft and survey metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session: survey_session::Model,
    pub draft: Option<participant_survey_draft::Model>,
    pub survey: SurveyOverview,
}

/// Input for saving a participant draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftInput {
    #[serde(default)]
    pub last_question_id: Option<i32>,
    /// Map of question id to answer value.
    pub draft_answers: JsonValue,
}

/// One answer in a submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i32,
    #[serde(default)]
    pub response_data: Option<JsonValue>,
}

/// Input for submitting a session.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitInput {
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// An answer left out of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAnswer {
    pub question_id: i32,
    pub reason: String,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub session_id: i32,
    pub answers_saved: u64,
    pub skipped: Vec<SkippedAnswer>,
}

/// Participant session service.
#[derive(Clone)]
pub struct SessionService {
    db: Arc<DatabaseConnection>,
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    session_repo: SurveySessionRepository,
    draft_repo: ParticipantDraftRepository,
    answer_repo: AnswerRepository,
    answer_policy: AnswerEncodingPolicy,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub const fn new(
        db: Arc<DatabaseConnection>,
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        session_repo: SurveySessionRepository,
        draft_repo: ParticipantDraftRepository,
        answer_repo: AnswerRepository,
        answer_policy: AnswerEncodingPolicy,
    ) -> Self {
        Self {
            db,
            survey_repo,
            question_repo,
            session_repo,
            draft_repo,
            answer_repo,
            answer_policy,
        }
    }

    /// Start a session for a published survey, or resume the one in progress.
    pub async fn start_or_resume(
        &self,
        survey_id: i32,
        participant_id: i32,
    ) -> AppResult<SessionView> {
        let survey = self.survey_repo.get_by_id(survey_id).await?;
        if survey.status != survey::SurveyStatus::Published {
            return Err(AppError::Conflict("survey is not published".to_string()));
        }

        let session = match self
            .session_repo
            .find_in_progress(survey_id, participant_id)
            .await?
        {
            Some(session) => session,
            None => match self
                .session_repo
                .create_in_progress(survey_id, participant_id)
                .await
            {
                Ok(session) => {
                    info!(
                        session_id = session.id,
                        survey_id, participant_id, "Started survey session"
                    );
                    session
                }
                // Lost the race against a concurrent start; use the winner's row.
                Err(AppError::Conflict(_)) => self
                    .session_repo
                    .find_in_progress(survey_id, participant_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Conflict("survey session changed concurrently".to_string())
                    })?,
                Err(e) => return Err(e),
            },
        };

        self.view(session, survey).await
    }

    /// Get the in-progress session without creating one.
    pub async fn get_current_session(
        &self,
        survey_id: i32,
        participant_id: i32,
    ) -> AppResult<SessionView> {
        let survey = self.survey_repo.get_by_id(survey_id).await?;
        let session = self
            .session_repo
            .find_in_progress(survey_id, participant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No session in progress".to_string()))?;

        self.view(session, survey).await
    }

    /// Save the participant's draft answers for a session.
    ///
    /// Repeated saves overwrite the same row.
    pub async fn save_draft(
        &self,
        session_id: i32,
        participant_id: i32,
        input: SaveDraftInput,
    ) -> AppResult<participant_survey_draft::Model> {
        let session = self.owned_session(session_id, participant_id).await?;
        if session.session_status != SessionStatus::InProgress {
            return Err(AppError::Conflict(
                "survey session is not in progress".to_string(),
            ));
        }

        if !input.draft_answers.is_object() {
            return Err(AppError::Validation(
                "draftAnswers must be an object keyed by question id".to_string(),
            ));
        }

        let draft = self
            .draft_repo
            .upsert(session.id, input.last_question_id, input.draft_answers)
            .await?;

        if let Some(question_id) = input.last_question_id {
            self.session_repo
                .set_last_question(session.id, question_id)
                .await?;
        }

        Ok(draft)
    }

    /// Get the saved draft of a session.
    pub async fn get_draft(
        &self,
        session_id: i32,
        participant_id: i32,
    ) -> AppResult<participant_survey_draft::Model> {
        let session = self.owned_session(session_id, participant_id).await?;

        self.draft_repo
            .find_by_session(session.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draft not found for session: {session_id}")))
    }

    /// Submit a session's answers and mark it completed.
    ///
    /// The answer insert, status change and draft removal commit together or
    /// not at all.
    pub async fn submit(
        &self,
        session_id: i32,
        participant_id: i32,
        input: SubmitInput,
    ) -> AppResult<SubmitOutcome> {
        let session = self.owned_session(session_id, participant_id).await?;
        if session.session_status != SessionStatus::InProgress {
            return Err(AppError::Conflict(
                "survey session is not in progress".to_string(),
            ));
        }

        let (encoded, skipped) = encode_answers(&input.answers, self.answer_policy)?;

        let now = Utc::now();
        let models: Vec<answer::ActiveModel> = encoded
            .into_iter()
            .map(|(question_id, response)| answer::ActiveModel {
                session_id: Set(session.id),
                question_id: Set(question_id),
                response: Set(response),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            })
            .collect();

        let txn = self.db.begin().await.map_err(txn_err)?;

        let answers_saved = self.answer_repo.create_many_with(&txn, models).await?;

        if self.session_repo.complete_with(&txn, session.id).await? == 0 {
            return Err(AppError::Conflict(
                "survey session is not in progress".to_string(),
            ));
        }

        self.draft_repo
            .delete_by_session_with(&txn, session.id)
            .await?;

        txn.commit().await.map_err(txn_err)?;

        info!(
            session_id = session.id,
            answers_saved,
            skipped = skipped.len(),
            "Submitted survey session"
        );

        Ok(SubmitOutcome {
            session_id: session.id,
            answers_saved,
            skipped,
        })
    }

    async fn owned_session(
        &self,
        session_id: i32,
        participant_id: i32,
    ) -> AppResult<survey_session::Model> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::SessionNotFound(session_id))?;

        if session.participant_id != participant_id {
            return Err(AppError::Forbidden(
                "Session belongs to another participant".to_string(),
            ));
        }

        Ok(session)
    }

    async fn view(
        &self,
        session: survey_session::Model,
        survey: survey::Model,
    ) -> AppResult<SessionView> {
        let draft = self.draft_repo.find_by_session(session.id).await?;
        let question_count = self.question_repo.count_by_survey(survey.id).await?;

        Ok(SessionView {
            session,
            draft,
            survey: SurveyOverview {
                id: survey.id,
                title: survey.title,
                description: survey.description,
                status: survey.status,
                question_count,
            },
        })
    }
}

/// Encode submitted answers as canonical JSON text.
///
/// Missing or `null` responses and non-positive question ids cannot be
/// stored. They are skipped or fail the batch depending on `policy`.
fn encode_answers(
    answers: &[SubmittedAnswer],
    policy: AnswerEncodingPolicy,
) -> AppResult<(Vec<(i32, String)>, Vec<SkippedAnswer>)> {
    let mut encoded = Vec::with_capacity(answers.len());
    let mut skipped = Vec::new();

    for answer in answers {
        let result = if answer.question_id <= 0 {
            Err("question id must be positive".to_string())
        } else {
            match &answer.response_data {
                None | Some(JsonValue::Null) => Err("response is empty".to_string()),
                Some(value) => serde_json::to_string(value).map_err(|e| e.to_string()),
            }
        };

        match result {
            Ok(text) => encoded.push((answer.question_id, text)),
            Err(reason) => match policy {
                AnswerEncodingPolicy::FailWholeBatch => {
                    return Err(AppError::Validation(format!(
                        "answer for question {} cannot be stored: {reason}",
                        answer.question_id
                    )));
                }
                AnswerEncodingPolicy::SkipAndContinue => {
                    warn!(question_id = answer.question_id, reason = %reason, "Skipping answer");
                    skipped.push(SkippedAnswer {
                        question_id: answer.question_id,
                        reason,
                    });
                }
            },
        }
    }

    Ok((encoded, skipped))
}
