//! Survey question entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    #[sea_orm(string_value = "TEXT")]
    Text,
    #[sea_orm(string_value = "SINGLE_CHOICE")]
    SingleChoice,
    #[sea_orm(string_value = "MULTIPLE_CHOICE")]
    MultipleChoice,
    #[sea_orm(string_value = "RATING")]
    Rating,
    #[sea_orm(string_value = "FILE_UPLOAD")]
    FileUpload,
    #[sea_orm(string_value = "VIDEO")]
    Video,
    #[sea_orm(string_value = "AUDIO")]
    Audio,
}

impl QuestionType {
    /// Whether answers pick from a fixed list of options.
    #[must_use]
    pub const fn requires_options(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultipleChoice)
    }
}

/// Reporting category of a question.
///
/// Demographic categories are reported in the survey summary instead of the
/// per-question results table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionCategory {
    #[sea_orm(string_value = "GENERAL")]
    #[default]
    General,
    #[sea_orm(string_value = "GENDER")]
    Gender,
    #[sea_orm(string_value = "AGE")]
    Age,
    #[sea_orm(string_value = "GEOGRAPHY")]
    Geography,
}

impl QuestionCategory {
    /// Guess a category from question text.
    ///
    /// Used once when a question is authored without an explicit category.
    /// Checks "gender", then "location"/"geography", then "age".
    #[must_use]
    pub fn infer_from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("gender") {
            Self::Gender
        } else if text.contains("location") || text.contains("geography") {
            Self::Geography
        } else if text.contains("age") {
            Self::Age
        } else {
            Self::General
        }
    }

    /// Whether answers are reported as demographics.
    #[must_use]
    pub const fn is_demographic(self) -> bool {
        !matches!(self, Self::General)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub survey_id: i32,

    #[sea_orm(column_type = "Text")]
    pub question_text: String,

    pub question_type: QuestionType,

    pub mandatory: bool,

    /// JSON text `{"condition": ..., "next_question": ...}`
    #[sea_orm(column_type = "Text", nullable)]
    pub branching_logic: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub correct_answers: Option<String>,

    pub category: QuestionCategory,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey::Entity",
        from = "Column::SurveyId",
        to = "super::survey::Column::Id",
        on_delete = "Cascade"
    )]
    Survey,

    #[sea_orm(has_many = "super::question_option::Entity")]
    QuestionOption,
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl Related<super::question_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuestionOption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_checks_gender_first() {
        assert_eq!(
            QuestionCategory::infer_from_text("What gender and age are you?"),
            QuestionCategory::Gender
        );
    }

    #[test]
    fn test_infer_category_location_before_age() {
        assert_eq!(
            QuestionCategory::infer_from_text("Your Location (village or city)"),
            QuestionCategory::Geography
        );
        assert_eq!(
            QuestionCategory::infer_from_text("Your AGE group"),
            QuestionCategory::Age
        );
        assert_eq!(
            QuestionCategory::infer_from_text("How satisfied are you?"),
            QuestionCategory::General
        );
    }

    #[test]
    fn test_choice_types_require_options() {
        assert!(QuestionType::SingleChoice.requires_options());
        assert!(QuestionType::MultipleChoice.requires_options());
        assert!(!QuestionType::Rating.requires_options());
    }
}
