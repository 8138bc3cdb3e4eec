//! Survey results aggregation.
//!
//! Results are computed on request from completed sessions and their
//! answers. Answers are grouped by their displayed text; the question
//! category decides whether a question feeds the per-question table or one of
//! the demographic breakdowns. Percentages are shares of all completed
//! sessions, so unanswered optional questions stay below 100.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use survey_common::AppResult;
use survey_db::entities::{
    answer,
    question::{self, QuestionCategory, QuestionType},
    survey, survey_session,
};
use survey_db::repositories::{
    AnswerRepository, QuestionRepository, SurveyRepository, SurveySessionRepository,
};

use super::access::Actor;

/// How often one response was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseCount {
    pub response: String,
    pub count: u64,
    pub percentage: f64,
}

/// Response distribution for one question.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub question_id: i32,
    pub question_text: String,
    pub question_type: QuestionType,
    pub total_responses: u64,
    pub responses: Vec<ResponseCount>,
}

/// Completed sessions on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: String,
    pub responses: u64,
}

/// Demographic breakdowns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Demographics {
    pub gender: Vec<ResponseCount>,
    pub geography: Vec<ResponseCount>,
    pub age_groups: Vec<ResponseCount>,
}

/// Headline numbers for a survey.
#[derive(Debug, Clone, Serialize)]
pub struct SurveySummary {
    pub survey_id: i32,
    pub total_responses: u64,
    pub average_time_seconds: f64,
    pub timeline: Vec<TimelinePoint>,
    pub demographics: Demographics,
}

/// Headline numbers plus the per-question table.
#[derive(Debug, Clone, Serialize)]
pub struct CombinedResults {
    pub survey_id: i32,
    pub total_responses: u64,
    pub average_time_seconds: f64,
    pub questions: Vec<QuestionResult>,
}

struct Loaded {
    survey: survey::Model,
    sessions: Vec<survey_session::Model>,
    questions: Vec<question::Model>,
    answers: Vec<answer::Model>,
}

/// Results service.
#[derive(Clone)]
pub struct ResultsService {
    survey_repo: SurveyRepository,
    question_repo: QuestionRepository,
    session_repo: SurveySessionRepository,
    answer_repo: AnswerRepository,
}

impl ResultsService {
    /// Create a new results service.
    #[must_use]
    pub const fn new(
        survey_repo: SurveyRepository,
        question_repo: QuestionRepository,
        session_repo: SurveySessionRepository,
        answer_repo: AnswerRepository,
    ) -> Self {
        Self {
            survey_repo,
            question_repo,
            session_repo,
            answer_repo,
        }
    }

    /// Totals, timeline and demographics.
    pub async fn summary(&self, actor: Actor, survey_id: i32) -> AppResult<SurveySummary> {
        let loaded = self.load(actor, survey_id).await?;

        Ok(SurveySummary {
            survey_id: loaded.survey.id,
            total_responses: loaded.sessions.len() as u64,
            average_time_seconds: average_duration_secs(&loaded.sessions),
            timeline: timeline(&loaded.sessions),
            demographics: demographics(
                &loaded.questions,
                &loaded.answers,
                loaded.sessions.len() as u64,
            ),
        })
    }

    /// Per-question response distributions for general questions.
    pub async fn detailed(&self, actor: Actor, survey_id: i32) -> AppResult<Vec<QuestionResult>> {
        let loaded = self.load(actor, survey_id).await?;
        Ok(question_results(
            &loaded.questions,
            &loaded.answers,
            loaded.sessions.len() as u64,
        ))
    }

    /// Totals together with the per-question table.
    pub async fn combined(&self, actor: Actor, survey_id: i32) -> AppResult<CombinedResults> {
        let loaded = self.load(actor, survey_id).await?;

        Ok(CombinedResults {
            survey_id: loaded.survey.id,
            total_responses: loaded.sessions.len() as u64,
            average_time_seconds: average_duration_secs(&loaded.sessions),
            questions: question_results(
                &loaded.questions,
                &loaded.answers,
                loaded.sessions.len() as u64,
            ),
        })
    }

    async fn load(&self, actor: Actor, survey_id: i32) -> AppResult<Loaded> {
        let survey = self.survey_repo.get_by_id(survey_id).await?;
        actor.ensure_can_manage(survey.conductor_id, "survey")?;

        let sessions = self.session_repo.find_completed_by_survey(survey_id).await?;
        let questions = self.question_repo.find_by_survey(survey_id).await?;
        let session_ids: Vec<i32> = sessions.iter().map(|s| s.id).collect();
        let answers = self.answer_repo.find_by_sessions(&session_ids).await?;

        Ok(Loaded {
            survey,
            sessions,
            questions,
            answers,
        })
    }
}

/// Mean of `updated_at - created_at` in seconds, 0 with no sessions.
#[allow(clippy::cast_precision_loss)]
fn average_duration_secs(sessions: &[survey_session::Model]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total: i64 = sessions
        .iter()
        .map(|s| (s.updated_at - s.created_at).num_seconds())
        .sum();
    total as f64 / sessions.len() as f64
}

/// Completed sessions per calendar day of their start, oldest first.
fn timeline(sessions: &[survey_session::Model]) -> Vec<TimelinePoint> {
    let mut days: BTreeMap<String, u64> = BTreeMap::new();
    for session in sessions {
        *days
            .entry(session.created_at.format("%Y-%m-%d").to_string())
            .or_default() += 1;
    }
    days.into_iter()
        .map(|(date, responses)| TimelinePoint { date, responses })
        .collect()
}

/// Text shown for a stored response: the decoded string for JSON strings,
/// otherwise the stored text.
fn display_text(stored: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(stored) {
        Ok(serde_json::Value::String(s)) => s,
        _ => stored.to_string(),
    }
}

/// Group responses by displayed text, most frequent first.
///
/// `sessions` is the number of completed sessions and is the denominator of
/// every percentage.
#[allow(clippy::cast_precision_loss)]
fn tally<'a>(responses: impl IntoIterator<Item = &'a str>, sessions: u64) -> Vec<ResponseCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for response in responses {
        *counts.entry(display_text(response)).or_default() += 1;
    }

    let mut result: Vec<ResponseCount> = counts
        .into_iter()
        .map(|(response, count)| ResponseCount {
            response,
            count,
            percentage: if sessions == 0 {
                0.0
            } else {
                count as f64 / sessions as f64 * 100.0
            },
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.response.cmp(&b.response)));
    result
}

fn answers_by_question(answers: &[answer::Model]) -> HashMap<i32, Vec<&str>> {
    let mut grouped: HashMap<i32, Vec<&str>> = HashMap::new();
    for answer in answers {
        grouped
            .entry(answer.question_id)
            .or_default()
            .push(answer.response.as_str());
    }
    grouped
}

fn question_results(
    questions: &[question::Model],
    answers: &[answer::Model],
    sessions: u64,
) -> Vec<QuestionResult> {
    let grouped = answers_by_question(answers);

    questions
        .iter()
        .filter(|q| q.category == QuestionCategory::General)
        .map(|q| {
            let responses = grouped.get(&q.id).map(Vec::as_slice).unwrap_or_default();
            QuestionResult {
                question_id: q.id,
                question_text: q.question_text.clone(),
                question_type: q.question_type,
                total_responses: responses.len() as u64,
                responses: tally(responses.iter().copied(), sessions),
            }
        })
        .collect()
}

fn demographics(
    questions: &[question::Model],
    answers: &[answer::Model],
    sessions: u64,
) -> Demographics {
    let grouped = answers_by_question(answers);
    let breakdown = |category: QuestionCategory| {
        tally(
            questions
                .iter()
                .filter(|q| q.category == category)
                .filter_map(|q| grouped.get(&q.id))
                .flatten()
                .copied(),
            sessions,
        )
    };

    Demographics {
        gender: breakdown(QuestionCategory::Gender),
        geography: breakdown(QuestionCategory::Geography),
        age_groups: breakdown(QuestionCategory::Age),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use survey_common::AppError;
    use survey_db::entities::survey_session::SessionStatus;

    fn ts(s: &str) -> sea_orm::prelude::DateTimeWithTimeZone {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn session(id: i32, start: &str, end: &str) -> survey_session::Model {
        survey_session::Model {
            id,
            survey_id: 1,
            participant_id: id + 100,
            last_question_id: None,
            session_status: SessionStatus::Completed,
            created_at: ts(start),
            updated_at: ts(end),
        }
    }

    fn question(id: i32, text: &str, category: QuestionCategory) -> question::Model {
        question::Model {
            id,
            survey_id: 1,
            question_text: text.to_string(),
            question_type: QuestionType::SingleChoice,
            mandatory: true,
            branching_logic: None,
            correct_answers: None,
            category,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn answer(id: i32, session_id: i32, question_id: i32, response: &str) -> answer::Model {
        answer::Model {
            id,
            session_id,
            question_id,
            response: response.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_average_duration() {
        let sessions = vec![
            session(1, "2025-01-01T10:00:00Z", "2025-01-01T10:01:00Z"),
            session(2, "2025-01-02T10:00:00Z", "2025-01-02T10:03:00Z"),
        ];
        assert!((average_duration_secs(&sessions) - 120.0).abs() < f64::EPSILON);
        assert!(average_duration_secs(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_timeline_uses_start_day() {
        // Started before midnight, submitted after.
        let sessions = vec![session(1, "2025-01-01T23:50:00Z", "2025-01-02T00:10:00Z")];

        assert_eq!(timeline(&sessions)[0].date, "2025-01-01");
    }

    #[test]
    fn test_timeline_groups_by_day() {
        let sessions = vec![
            session(1, "2025-01-02T09:00:00Z", "2025-01-02T10:00:00Z"),
            session(2, "2025-01-01T09:00:00Z", "2025-01-01T10:00:00Z"),
            session(3, "2025-01-02T11:00:00Z", "2025-01-02T12:00:00Z"),
        ];

        assert_eq!(
            timeline(&sessions),
            vec![
                TimelinePoint {
                    date: "2025-01-01".to_string(),
                    responses: 1
                },
                TimelinePoint {
                    date: "2025-01-02".to_string(),
                    responses: 2
                },
            ]
        );
    }

    #[test]
    fn test_tally_sorts_and_decodes() {
        let counts = tally([r#""Yes""#, r#""No""#, r#""Yes""#, "4"], 4);

        assert_eq!(counts[0].response, "Yes");
        assert_eq!(counts[0].count, 2);
        assert!((counts[0].percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(counts[1].response, "4");
        assert_eq!(counts[2].response, "No");
    }

    #[test]
    fn test_tally_merges_same_display_text() {
        let counts = tally([r#""4""#, "4", "5"], 3);

        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].response, "4");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].response, "5");
    }

    #[test]
    fn test_tally_empty() {
        assert!(tally(std::iter::empty(), 0).is_empty());
        assert!(tally(std::iter::empty(), 3).is_empty());
    }

    #[test]
    fn test_tally_without_sessions_reports_zero_percent() {
        let counts = tally([r#""Yes""#], 0);
        assert!(counts[0].percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_question_results_skip_demographic_questions() {
        let questions = vec![
            question(1, "What is your gender?", QuestionCategory::Gender),
            question(2, "Favourite colour", QuestionCategory::General),
        ];
        let answers = vec![
            answer(1, 1, 1, r#""Female""#),
            answer(2, 1, 2, r#""Blue""#),
            answer(3, 2, 2, r#""Blue""#),
        ];

        let results = question_results(&questions, &answers, 2);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question_id, 2);
        assert_eq!(results[0].total_responses, 2);
        assert_eq!(results[0].responses[0].response, "Blue");
        assert!((results[0].responses[0].percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentages_count_unanswered_sessions() {
        let questions = vec![question(2, "Favourite colour", QuestionCategory::General)];
        // Four completed sessions, two of which skipped the question.
        let answers = vec![answer(1, 1, 2, r#""Blue""#), answer(2, 2, 2, r#""Blue""#)];

        let results = question_results(&questions, &answers, 4);

        assert_eq!(results[0].total_responses, 2);
        assert_eq!(results[0].responses[0].count, 2);
        assert!((results[0].responses[0].percentage - 50.0).abs() < f64::EPSILON);

        let demographics = demographics(
            &[question(3, "Gender", QuestionCategory::Gender)],
            &[answer(3, 1, 3, r#""Female""#)],
            4,
        );
        assert!((demographics.gender[0].percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_demographics_use_stored_category() {
        // Text mentions age but the stored category wins.
        let questions = vec![
            question(1, "Your age bracket", QuestionCategory::General),
            question(2, "Where do you live?", QuestionCategory::Geography),
        ];
        let answers = vec![answer(1, 1, 1, r#""18-25""#), answer(2, 1, 2, r#""Oslo""#)];

        let demographics = demographics(&questions, &answers, 1);

        assert!(demographics.age_groups.is_empty());
        assert_eq!(demographics.geography[0].response, "Oslo");
    }

    #[tokio::test]
    async fn test_summary_requires_owner() {
        let survey = survey::Model {
            id: 1,
            conductor_id: 3,
            title: "T".to_string(),
            description: String::new(),
            is_self_recruitment: false,
            status: survey::SurveyStatus::Published,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[survey]])
                .into_connection(),
        );
        let service = ResultsService::new(
            SurveyRepository::new(Arc::clone(&db)),
            QuestionRepository::new(Arc::clone(&db)),
            SurveySessionRepository::new(Arc::clone(&db)),
            AnswerRepository::new(Arc::clone(&db)),
        );

        let result = service.summary(Actor::new(4, false), 1).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
