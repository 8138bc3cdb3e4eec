//! Business logic services.

#![allow(missing_docs)]

pub mod access;
pub mod answer;
pub mod conductor;
pub mod draft;
pub mod email;
pub mod media;
pub mod option;
pub mod question;
pub mod results;
pub mod role;
pub mod session;
pub mod survey;

pub use access::Actor;
pub use answer::{AnswerService, BulkAnswersInput, CreateAnswerInput};
pub use conductor::{
    ConductorPage, ConductorService, RegisterConductorInput, UpdateConductorInput,
};
pub use draft::{
    CreateDraftInput, DraftService, PublishOutcome, SkippedItem, SkippedKind, UpdateDraftInput,
};
pub use email::{Mailer, NoOpMailer, SmtpMailer};
pub use media::{MediaService, MediaUpload};
pub use option::{BatchCreateOptionsInput, CreateOptionInput, OptionService, UpdateOptionInput};
pub use question::{
    CreateQuestionInput, QuestionService, QuestionWithOptions, UpdateQuestionInput,
};
pub use results::{
    CombinedResults, Demographics, QuestionResult, ResponseCount, ResultsService, SurveySummary,
    TimelinePoint,
};
pub use role::{AuthServiceClient, NoOpRoleAssigner, RoleAssigner};
pub use session::{
    SaveDraftInput, SessionService, SessionView, SkippedAnswer, SubmitInput, SubmitOutcome,
    SubmittedAnswer, SurveyOverview,
};
pub use survey::{
    CreateSurveyInput, RequirementInput, SurveyDetail, SurveyProgress, SurveyService,
    UpdateSurveyInput,
};

/// Map a transaction begin/commit failure.
pub(crate) fn txn_err(e: sea_orm::DbErr) -> survey_common::AppError {
    survey_common::AppError::Database(e.to_string())
}
