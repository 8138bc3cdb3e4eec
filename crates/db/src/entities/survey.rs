//! Survey entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication state of a survey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyStatus {
    /// Still being authored.
    #[sea_orm(string_value = "DRAFT")]
    #[default]
    Draft,
    /// Open to participants.
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "surveys")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// User id of the authoring conductor
    #[sea_orm(indexed)]
    pub conductor_id: i32,

    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub is_self_recruitment: bool,

    pub status: SurveyStatus,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Question,

    #[sea_orm(has_many = "super::survey_requirement::Entity")]
    SurveyRequirement,

    #[sea_orm(has_many = "super::survey_draft::Entity")]
    SurveyDraft,

    #[sea_orm(has_many = "super::survey_session::Entity")]
    SurveySession,

    #[sea_orm(has_many = "super::survey_media_file::Entity")]
    SurveyMediaFile,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::survey_requirement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyRequirement.def()
    }
}

impl Related<super::survey_draft::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyDraft.def()
    }
}

impl Related<super::survey_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveySession.def()
    }
}

impl Related<super::survey_media_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveyMediaFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
