//! In-progress answers saved by a participant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "participant_survey_drafts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// At most one draft per session
    #[sea_orm(unique)]
    pub session_id: i32,

    #[sea_orm(nullable)]
    pub last_answered_question_id: Option<i32>,

    #[sea_orm(column_type = "JsonBinary")]
    pub draft_answers_content: Json,

    pub last_saved: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::survey_session::Entity",
        from = "Column::SessionId",
        to = "super::survey_session::Column::Id",
        on_delete = "Cascade"
    )]
    SurveySession,
}

impl Related<super::survey_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SurveySession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
