//! Repository layer.
//!
//! Each repository wraps a shared [`DatabaseConnection`](sea_orm::DatabaseConnection).
//! Methods ending in `_with` take any [`ConnectionTrait`](sea_orm::ConnectionTrait)
//! so services can run them inside a transaction.

mod answer;
mod conductor;
mod participant_draft;
mod question;
mod question_option;
mod survey;
mod survey_draft;
mod survey_media_file;
mod survey_requirement;
mod survey_session;

pub use answer::AnswerRepository;
pub use conductor::ConductorRepository;
pub use participant_draft::ParticipantDraftRepository;
pub use question::QuestionRepository;
pub use question_option::OptionRepository;
pub use survey::SurveyRepository;
pub use survey_draft::SurveyDraftRepository;
pub use survey_media_file::SurveyMediaFileRepository;
pub use survey_requirement::SurveyRequirementRepository;
pub use survey_session::SurveySessionRepository;

use sea_orm::{DbErr, SqlErr};
use survey_common::AppError;

/// Map a write error, turning unique-constraint violations into `Conflict`.
pub(crate) fn map_unique_violation(err: DbErr, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        _ => AppError::Database(err.to_string()),
    }
}
