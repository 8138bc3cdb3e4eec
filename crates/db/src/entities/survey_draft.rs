//! Authoring draft of a survey.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "survey_drafts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Published survey this draft edits, if any
    #[sea_orm(indexed, nullable)]
    pub survey_id: Option<i32>,

    #[sea_orm(indexed)]
    pub author_id: i32,

    /// Whole authoring document (basic info, questions, options, media, requirements)
    #[sea_orm(column_type = "JsonBinary")]
    pub draft_content: Json,

    #[sea_orm(nullable)]
    pub last_edited_question: Option<i32>,

    pub last_saved: DateTimeWithTimeZone,

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
}

impl Related<super::survey::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Survey.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
