//! Database entities.

#![allow(missing_docs)]

pub mod answer;
pub mod conductor;
pub mod participant_survey_draft;
pub mod question;
pub mod question_option;
pub mod survey;
pub mod survey_draft;
pub mod survey_media_file;
pub mod survey_requirement;
pub mod survey_session;

pub use answer::Entity as Answer;
pub use conductor::Entity as Conductor;
pub use participant_survey_draft::Entity as ParticipantSurveyDraft;
pub use question::Entity as Question;
pub use question_option::Entity as QuestionOption;
pub use survey::Entity as Survey;
pub use survey_draft::Entity as SurveyDraft;
pub use survey_media_file::Entity as SurveyMediaFile;
pub use survey_requirement::Entity as SurveyRequirement;
pub use survey_session::Entity as SurveySession;
